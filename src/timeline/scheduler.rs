// Animation scheduler - gates the display-refresh redraw loop
// The host UI calls back once per frame; this only tracks whether the
// timeline wants those frames

#[derive(Debug, Default)]
pub struct AnimationScheduler {
    running: bool,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the redraw loop. No-op when already running.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Cancel the pending iteration. Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_idempotent() {
        let mut scheduler = AnimationScheduler::new();
        assert!(!scheduler.is_running());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
