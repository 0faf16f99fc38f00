use std::time::{Duration, Instant};

/// Monotonic clock abstraction so timer-driven behavior (success auto-dismiss,
/// poll pacing checks) stays deterministic under test.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Whether `deadline` has been reached.
    fn deadline_passed(&self, deadline: Instant) -> bool {
        self.now() >= deadline
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests; time only moves when advanced manually.
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// now() = origin + offset; `advance` moves the offset forward.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::TestClock;
    use super::*;

    #[test]
    fn test_clock_advances_deterministically() {
        let clock = TestClock::new();
        let epoch = clock.now();
        assert!(!clock.deadline_passed(epoch + Duration::from_secs(1)));
        clock.advance(Duration::from_millis(1500));
        assert!(clock.deadline_passed(epoch + Duration::from_secs(1)));
        assert!(!clock.deadline_passed(epoch + Duration::from_secs(2)));
    }
}
