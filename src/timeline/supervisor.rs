// Failure containment - one-way circuit breaker around timeline operations
// A visualization that keeps failing must take itself out rather than
// destabilize the host music environment

/// Breaker state. There is no transition out of `Tripped` within a process
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Armed,
    Tripped,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: BreakerState,
    error_count: u32,
    max_errors: u32,
}

impl CircuitBreaker {
    pub fn new(max_errors: u32) -> Self {
        Self {
            state: BreakerState::Armed,
            error_count: 0,
            max_errors,
        }
    }

    /// Count one failure. Returns true when the count now exceeds the
    /// threshold and the caller must trip the breaker.
    pub fn record_failure(&mut self) -> bool {
        self.error_count = self.error_count.saturating_add(1);
        self.error_count > self.max_errors
    }

    /// One-way transition to `Tripped`.
    pub fn trip(&mut self) {
        self.state = BreakerState::Tripped;
    }

    pub fn is_tripped(&self) -> bool {
        self.state == BreakerState::Tripped
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_monotonic() {
        let mut breaker = CircuitBreaker::new(5);
        let mut previous = 0;
        for _ in 0..10 {
            breaker.record_failure();
            assert!(breaker.error_count() >= previous);
            previous = breaker.error_count();
        }
        assert_eq!(breaker.error_count(), 10);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let mut breaker = CircuitBreaker::new(5);
        for _ in 0..5 {
            assert!(!breaker.record_failure());
        }
        // The sixth failure crosses the threshold.
        assert!(breaker.record_failure());
    }

    #[test]
    fn test_trip_is_one_way() {
        let mut breaker = CircuitBreaker::new(0);
        assert_eq!(breaker.state(), BreakerState::Armed);

        breaker.trip();
        assert!(breaker.is_tripped());

        // Further failures change the count, never the state.
        breaker.record_failure();
        assert!(breaker.is_tripped());
    }

    #[test]
    fn test_zero_threshold_trips_on_first_failure() {
        let mut breaker = CircuitBreaker::new(0);
        assert!(breaker.record_failure());
    }
}
