// Timeline visualization engine
//
// Discovers live instruments, tracks their activity across the host's beat
// signal, and projects the result onto a render surface. Every externally
// reachable operation runs behind a one-way circuit breaker: after repeated
// errors the whole subsystem tears itself down and goes inert instead of
// risking the host music environment.

pub mod activity;
pub mod mute;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod supervisor;

use crate::host::bus::{BusError, BusEvent, BusEventConsumer, EventBus, SubscriptionId, Topic};
use crate::host::instruments::{InstrumentSource, ProbeError};
use crate::timeline::registry::Registry;
use crate::timeline::render::TimelineSurface;
use crate::timeline::scheduler::AnimationScheduler;
use crate::timeline::supervisor::CircuitBreaker;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tunables for the timeline engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Errors tolerated before the subsystem disables itself.
    pub max_errors: u32,
    /// Beats per measure of the host clock.
    pub beats_per_measure: u32,
    /// Delay before the first collection pass, giving the audio engine time
    /// to finish constructing its objects.
    pub startup_delay_ms: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_errors: 5,
            beats_per_measure: 4,
            startup_delay_ms: 1000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("event bus error: {0}")]
    Bus(#[from] BusError),

    #[error("instrument probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("shared state lock poisoned")]
    Poisoned,
}

/// Live bus subscriptions; taken back out during teardown.
struct BusHooks {
    clear_id: SubscriptionId,
    clear_rx: BusEventConsumer,
    tick_id: SubscriptionId,
    tick_rx: BusEventConsumer,
}

/// The timeline visualization context. Owns all mutable state; one instance
/// per widget, constructed by [`TimelineViz::init`].
pub struct TimelineViz {
    config: TimelineConfig,
    bus: EventBus,
    source: Arc<dyn InstrumentSource>,
    surface: Box<dyn TimelineSurface>,
    registry: Registry,
    scheduler: AnimationScheduler,
    breaker: CircuitBreaker,
    hooks: Option<BusHooks>,
    current_beat: u32,
    is_initialized: bool,
    first_scan_at: Option<Instant>,
}

impl TimelineViz {
    /// Wire up the visualization.
    ///
    /// When the surface is not attached this logs and returns a pre-disabled
    /// handle instead of partially subscribing; every method on that handle
    /// is a no-op. The first collection pass is deferred by
    /// `startup_delay_ms`.
    pub fn init(
        bus: EventBus,
        source: Arc<dyn InstrumentSource>,
        surface: Box<dyn TimelineSurface>,
        config: TimelineConfig,
    ) -> Self {
        let mut viz = Self {
            registry: Registry::new(),
            scheduler: AnimationScheduler::new(),
            breaker: CircuitBreaker::new(config.max_errors),
            hooks: None,
            current_beat: 0,
            is_initialized: false,
            first_scan_at: None,
            config,
            bus,
            source,
            surface,
        };

        if !viz.surface.is_attached() {
            warn!("timeline: render surface not attached, visualization disabled");
            viz.breaker.trip();
            return viz;
        }

        let (clear_id, clear_rx) = viz.bus.subscribe(Topic::Clear);
        let (tick_id, tick_rx) = viz.bus.subscribe(Topic::MetronomeTick);
        viz.hooks = Some(BusHooks {
            clear_id,
            clear_rx,
            tick_id,
            tick_rx,
        });
        viz.first_scan_at =
            Some(Instant::now() + Duration::from_millis(viz.config.startup_delay_ms));
        viz.is_initialized = true;
        info!("timeline visualization initialized");
        viz
    }

    /// Clear all discovered state and redraw. Bound to the host's "clear"
    /// signal, also safe to call directly.
    pub fn reset(&mut self) {
        self.guarded("reset", |t| {
            t.registry.clear();
            t.current_beat = 0;
            t.render()
        });
    }

    /// Begin the continuous redraw loop.
    pub fn start(&mut self) {
        self.guarded("start", |t| {
            t.scheduler.start();
            Ok(())
        });
    }

    /// Cancel the redraw loop. The bus subscriptions stay attached.
    pub fn stop(&mut self) {
        self.guarded("stop", |t| {
            t.scheduler.stop();
            Ok(())
        });
    }

    /// Toggle mute for the lane the user clicked, then redraw.
    pub fn toggle_mute(&mut self, id: &str) {
        let id = id.to_string();
        self.guarded("toggle_mute", move |t| {
            if let Some(record) = t.registry.get(&id) {
                mute::toggle_mute(record)?;
            }
            t.render()
        });
    }

    /// Per-frame pump, called by the host UI once per display refresh.
    ///
    /// Drains pending bus events, runs the deferred first scan once its delay
    /// has elapsed, and advances the animation loop while it is running. A
    /// failing loop iteration stops the loop; an animation loop that has
    /// shown it can crash must not keep spinning.
    pub fn on_frame(&mut self) {
        self.pump_events();

        if self.breaker.is_tripped() {
            return;
        }

        if let Some(at) = self.first_scan_at {
            if Instant::now() >= at {
                self.first_scan_at = None;
                self.guarded("initial_collect", |t| {
                    t.registry.collect(t.source.as_ref());
                    t.render()
                });
            }
        }

        if !self.scheduler.is_running() {
            return;
        }
        if let Err(err) = self.update_and_render() {
            error!("timeline animation loop error: {err}; stopping loop");
            self.scheduler.stop();
            self.count_failure();
        }
    }

    fn on_tick(&mut self, beat: u32) {
        self.guarded("update_on_tick", move |t| {
            t.current_beat = beat;
            t.update_and_render()
        });
    }

    fn update_and_render(&mut self) -> Result<(), TimelineError> {
        activity::update_active_states(&mut self.registry, self.source.as_ref(), self.current_beat);
        self.render()
    }

    fn render(&mut self) -> Result<(), TimelineError> {
        let view = render::build_view(&self.registry, self.current_beat);
        self.surface.present(&view)
    }

    fn drain_events(&mut self) -> Vec<BusEvent> {
        let mut events = Vec::new();
        if let Some(hooks) = self.hooks.as_mut() {
            while let Some(event) = ringbuf::traits::Consumer::try_pop(&mut hooks.clear_rx) {
                events.push(event);
            }
            while let Some(event) = ringbuf::traits::Consumer::try_pop(&mut hooks.tick_rx) {
                events.push(event);
            }
        }
        events
    }

    fn pump_events(&mut self) {
        for event in self.drain_events() {
            match event {
                BusEvent::Clear => self.reset(),
                BusEvent::MetronomeTick(beat) => self.on_tick(beat),
            }
        }
    }

    /// Run one operation behind the breaker. Once tripped, everything is a
    /// silent no-op.
    fn guarded(&mut self, op: &'static str, f: impl FnOnce(&mut Self) -> Result<(), TimelineError>) {
        if self.breaker.is_tripped() {
            return;
        }
        if let Err(err) = f(self) {
            warn!("timeline error in {op}: {err}");
            self.count_failure();
        }
    }

    fn count_failure(&mut self) {
        if self.breaker.record_failure() {
            self.disable();
        }
    }

    /// Permanently disable the subsystem. Best-effort: if teardown itself
    /// fails, still hide the surface as the single most important action.
    fn disable(&mut self) {
        self.breaker.trip();
        error!("timeline: too many errors, disabling visualization");
        if let Err(err) = self.teardown() {
            error!("timeline: failed to shut down cleanly: {err}");
            self.surface.hide();
        }
    }

    fn teardown(&mut self) -> Result<(), TimelineError> {
        if let Some(hooks) = self.hooks.take() {
            self.bus.unsubscribe(Topic::Clear, hooks.clear_id)?;
            self.bus.unsubscribe(Topic::MetronomeTick, hooks.tick_id)?;
        }
        self.scheduler.stop();
        self.registry.clear();
        self.current_beat = 0;
        self.first_scan_at = None;
        self.is_initialized = false;
        self.surface.hide();
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.breaker.is_tripped()
    }

    pub fn error_count(&self) -> u32 {
        self.breaker.error_count()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn instrument_count(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }
}
