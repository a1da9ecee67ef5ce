//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;
use serde::Serialize;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Default upper bound (exclusive) of the random jitter term.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(1000);

/// Delay schedule between retry attempts.
///
/// The delay after failed attempt `n` (1-based) is
/// `initial * 2^(n-1)`, optionally capped at `max`, plus a jitter drawn
/// uniformly from `[0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Option<Duration>,
    pub jitter: Duration,
}

impl Backoff {
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Deterministic part of the delay after failed attempt `attempt`.
    pub fn base(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = duration_ms(self.initial);
        let exponential_base = 2u64.saturating_pow(attempt - 1);
        let mut delay_ms = base_ms.saturating_mul(exponential_base);
        if let Some(max) = self.max {
            delay_ms = delay_ms.min(duration_ms(max));
        }

        Duration::from_millis(delay_ms)
    }

    /// Full delay after failed attempt `attempt`, jitter included.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base(attempt) + self.sample_jitter()
    }

    /// Half-open range `[low, high)` the delay after `attempt` falls in.
    pub fn bounds(&self, attempt: u32) -> (Duration, Duration) {
        let low = self.base(attempt);
        (low, low + self.jitter.max(Duration::from_millis(1)))
    }

    /// Delay windows for every retry a policy of `max_attempts` can make.
    pub fn schedule(&self, max_attempts: u32) -> Vec<DelayWindow> {
        (1..max_attempts)
            .map(|attempt| {
                let (low, high) = self.bounds(attempt);
                DelayWindow {
                    after_attempt: attempt,
                    min_ms: duration_ms(low),
                    max_ms_exclusive: duration_ms(high),
                }
            })
            .collect()
    }

    fn sample_jitter(&self) -> Duration {
        let jitter_ms = duration_ms(self.jitter);
        if jitter_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }
}

/// Range the delay slept after a failed attempt falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayWindow {
    pub after_attempt: u32,
    pub min_ms: u64,
    pub max_ms_exclusive: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_DELAY,
            max: None,
            jitter: DEFAULT_JITTER,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let backoff = Backoff::new(Duration::from_millis(1000));

        for _ in 0..50 {
            let b1 = backoff.delay(1).as_millis();
            assert!((1000..2000).contains(&b1), "got {b1}");

            let b2 = backoff.delay(2).as_millis();
            assert!((2000..3000).contains(&b2), "got {b2}");

            let b3 = backoff.delay(3).as_millis();
            assert!((4000..5000).contains(&b3), "got {b3}");
        }
    }

    #[test]
    fn test_zero_attempt_has_no_delay() {
        assert_eq!(Backoff::default().delay(0), Duration::ZERO);
    }

    #[test]
    fn test_without_jitter_is_deterministic() {
        let backoff = Backoff::new(Duration::from_millis(100)).with_jitter(Duration::ZERO);
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(4), Duration::from_millis(800));
    }

    #[test]
    fn test_cap_applies_before_jitter() {
        let backoff = Backoff::new(Duration::from_millis(100))
            .with_max(Duration::from_millis(1000))
            .with_jitter(Duration::from_millis(50));

        assert_eq!(backoff.base(10), Duration::from_millis(1000));
        let delay = backoff.delay(10).as_millis();
        assert!((1000..1050).contains(&delay));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let backoff = Backoff::default().with_jitter(Duration::ZERO);
        assert_eq!(backoff.base(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_schedule_has_one_window_per_retry() {
        let schedule = Backoff::default().schedule(3);
        assert_eq!(
            schedule,
            vec![
                DelayWindow { after_attempt: 1, min_ms: 1000, max_ms_exclusive: 2000 },
                DelayWindow { after_attempt: 2, min_ms: 2000, max_ms_exclusive: 3000 },
            ]
        );
        assert!(Backoff::default().schedule(1).is_empty());
        assert!(Backoff::default().schedule(0).is_empty());
    }

    #[test]
    fn test_bounds() {
        let (low, high) = Backoff::default().bounds(2);
        assert_eq!(low, Duration::from_millis(2000));
        assert_eq!(high, Duration::from_millis(3000));
    }
}
