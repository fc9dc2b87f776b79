//! Exponential backoff with jitter for retriable venue faults.

use std::time::Duration;

use rand::Rng;

/// Doubling backoff, capped and randomized by +/-20% jitter so a fleet of
/// ingestion loops retrying the same outage doesn't thunder back in
/// lockstep.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    /// Delay for the current attempt, then advance to the next.
    pub fn next_delay(&mut self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt);
        let raw = self.base.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        jitter(raw)
    }

    /// Reset back to the first attempt, called after a successful fetch.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

fn jitter(d: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let factor = rng.gen_range(0.8..1.2);
    Duration::from_secs_f64(d.as_secs_f64() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_with_each_attempt() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10));
        let first = backoff.next_delay();
        let second = backoff.next_delay();
        assert!(second.as_secs_f64() > first.as_secs_f64() * 1.2);
    }

    #[test]
    fn delay_is_capped_at_max() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(2));
        for _ in 0..10 {
            let d = backoff.next_delay();
            assert!(d.as_secs_f64() <= 2.0 * 1.2 + 0.001);
        }
    }

    #[test]
    fn reset_returns_to_first_attempt_delay_range() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
    }
}
