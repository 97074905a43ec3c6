use std::thread;
use std::time::Duration;

/// Fixed-interval pacing between outbound requests.
///
/// Enrichment traffic is strictly sequential; a pause after each request is
/// the only backpressure control. Tests construct [`Throttle::disabled`] so
/// they run without real delays.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pause(&self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn disabled_throttle_does_not_sleep() {
        let throttle = Throttle::disabled();
        let started = Instant::now();
        for _ in 0..100 {
            throttle.pause();
        }
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn interval_is_observable() {
        let throttle = Throttle::new(Duration::from_millis(150));
        assert_eq!(throttle.interval(), Duration::from_millis(150));
    }
}
