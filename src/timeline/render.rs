// View-model construction for the timeline
// Every render rebuilds the whole view from the current snapshot; with lane
// counts in the tens, full rebuilds are cheaper than correct diffing

use crate::timeline::TimelineError;
use crate::timeline::registry::{InstrumentKind, InstrumentRecord, Registry};

/// Shown instead of lanes when no instruments are discovered.
pub const PLACEHOLDER_TEXT: &str = "No instruments detected.\nCreate some music to see the timeline!";

/// Pattern-event marker slots per lane.
pub const MARKER_SLOTS: usize = 4;

/// Two-stop horizontal color gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub start: [u8; 3],
    pub end: [u8; 3],
}

const DRUMS_GRADIENT: Gradient = Gradient { start: [0x6A, 0x5A, 0xCD], end: [0x48, 0x3D, 0x8B] };
const SYNTH_GRADIENT: Gradient = Gradient { start: [0x4E, 0xCD, 0xC4], end: [0x2A, 0x9D, 0x8F] };
const BASS_GRADIENT: Gradient = Gradient { start: [0xFF, 0x6B, 0x6B], end: [0xF4, 0xA2, 0x61] };
const EFFECT_GRADIENT: Gradient = Gradient { start: [0xFF, 0x66, 0xB2], end: [0x9D, 0x4E, 0xDD] };
const DEFAULT_GRADIENT: Gradient = Gradient { start: [0x55, 0x55, 0x55], end: [0x33, 0x33, 0x33] };

impl InstrumentKind {
    /// Lane background gradient for this kind.
    pub fn gradient(&self) -> Gradient {
        match self {
            InstrumentKind::Drums => DRUMS_GRADIENT,
            InstrumentKind::Synth => SYNTH_GRADIENT,
            InstrumentKind::Bass => BASS_GRADIENT,
            InstrumentKind::Effect => EFFECT_GRADIENT,
            InstrumentKind::Default => DEFAULT_GRADIENT,
        }
    }
}

/// One pattern-event marker inside a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerView {
    pub slot: usize,
    /// Horizontal offset as a percentage of the pattern area.
    pub offset_pct: f32,
    pub width_pct: f32,
    /// The marker at the current beat is drawn brighter.
    pub highlighted: bool,
}

/// One rendered instrument lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneView {
    pub id: String,
    pub kind: InstrumentKind,
    pub gradient: Gradient,
    pub active: bool,
    pub markers: Vec<MarkerView>,
}

/// Complete projection of the registry for one beat.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    pub beat: u32,
    pub lanes: Vec<LaneView>,
    pub placeholder: Option<&'static str>,
}

impl TimelineView {
    pub fn empty() -> Self {
        Self {
            beat: 0,
            lanes: Vec::new(),
            placeholder: Some(PLACEHOLDER_TEXT),
        }
    }
}

/// Where the view is shown. Abstraction over the page's timeline container;
/// the widget is disabled at init when the container is missing.
pub trait TimelineSurface: Send {
    fn is_attached(&self) -> bool;

    fn present(&mut self, view: &TimelineView) -> Result<(), TimelineError>;

    /// Take the visualization off the screen. Must not fail; this is the
    /// last-resort action of the disable path.
    fn hide(&mut self);
}

/// Project the registry into a view. Total: always produces a view, lanes in
/// snapshot order, placeholder when there are none.
pub fn build_view(registry: &Registry, beat: u32) -> TimelineView {
    let lanes: Vec<LaneView> = registry.records().map(|r| build_lane(r, beat)).collect();
    let placeholder = lanes.is_empty().then_some(PLACEHOLDER_TEXT);
    TimelineView { beat, lanes, placeholder }
}

fn build_lane(record: &InstrumentRecord, beat: u32) -> LaneView {
    let markers = if record.patterns.is_empty() {
        Vec::new()
    } else {
        (0..MARKER_SLOTS)
            .map(|slot| MarkerView {
                slot,
                offset_pct: slot as f32 * 25.0,
                width_pct: 22.0,
                highlighted: slot as u32 == beat,
            })
            .collect()
    };

    LaneView {
        id: record.id.clone(),
        kind: record.kind,
        gradient: record.kind.gradient(),
        active: record.active,
        markers,
    }
}
