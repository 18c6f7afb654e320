// Livecode Playground - Library exports for tests and the app binary

pub mod host;
pub mod sim;
pub mod timeline;
pub mod ui;

// Re-export commonly used types for convenience
pub use host::bus::{BusEvent, EventBus, Topic};
pub use host::instruments::{GainRef, Instrument, InstrumentSource, NoteSequencer};
pub use timeline::registry::{InstrumentKind, Registry};
pub use timeline::render::{TimelineSurface, TimelineView};
pub use timeline::supervisor::{BreakerState, CircuitBreaker};
pub use timeline::{TimelineConfig, TimelineError, TimelineViz};
pub use ui::app::PlaygroundApp;
pub use ui::widget::TimelineWidget;
