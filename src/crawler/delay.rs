//! Randomized request delays
//!
//! Requests are spaced by a delay drawn uniformly from the configured range so
//! that traffic does not arrive at a fixed interval. Retries wait a backoff
//! delay of twice a fresh sample.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Smallest delay ever produced unless overridden
pub const DEFAULT_DELAY_FLOOR: Duration = Duration::from_millis(100);

/// Multiplier applied to a sampled delay before a retry
const BACKOFF_MULTIPLIER: u32 = 2;

/// Bounded-uniform delay distribution with a positive floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    min: Duration,
    max: Duration,
    floor: Duration,
}

impl DelayPolicy {
    /// Creates a policy sampling from `[min, max]`
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            floor: DEFAULT_DELAY_FLOOR,
        }
    }

    /// Overrides the floor; a zero floor is raised to one millisecond
    pub fn with_floor(mut self, floor: Duration) -> Self {
        self.floor = floor.max(Duration::from_millis(1));
        self
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        let (min, max) = config.delay_range();
        Self::new(min, max).with_floor(config.delay_floor())
    }

    /// Samples the delay to wait before a request
    pub fn delay(&self) -> Duration {
        let sampled = rand::thread_rng().gen_range(self.min..=self.max);
        sampled.max(self.floor)
    }

    /// Samples the delay to wait after a failed attempt
    pub fn backoff(&self) -> Duration {
        self.delay() * BACKOFF_MULTIPLIER
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let policy = DelayPolicy::new(Duration::from_millis(200), Duration::from_millis(500));
        for _ in 0..200 {
            let delay = policy.delay();
            assert!(delay >= Duration::from_millis(200), "{:?}", delay);
            assert!(delay <= Duration::from_millis(500), "{:?}", delay);
        }
    }

    #[test]
    fn test_delay_is_floored() {
        let policy = DelayPolicy::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.delay(), DEFAULT_DELAY_FLOOR);

        let policy = policy.with_floor(Duration::ZERO);
        assert_eq!(policy.delay(), Duration::from_millis(1));
    }

    #[test]
    fn test_backoff_doubles_the_delay() {
        let policy = DelayPolicy::new(Duration::from_millis(300), Duration::from_millis(300));
        assert_eq!(policy.delay(), Duration::from_millis(300));
        assert_eq!(policy.backoff(), Duration::from_millis(600));
    }

    #[test]
    fn test_long_delays_sample_without_overflow() {
        // Nanosecond counts above u64::MAX
        let min = Duration::from_secs(10_000_000_000);
        let max = Duration::from_secs(20_000_000_000);
        let policy = DelayPolicy::new(min, max);

        for _ in 0..50 {
            let delay = policy.delay();
            assert!(delay >= min && delay <= max, "{:?}", delay);
        }
    }

    #[test]
    fn test_swapped_bounds() {
        let policy = DelayPolicy::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(policy.min(), Duration::from_secs(1));
        assert_eq!(policy.max(), Duration::from_secs(3));
    }

    #[test]
    fn test_from_config() {
        let mut config = CrawlerConfig::for_seed("https://example.com/");
        config.min_delay = 0.25;
        config.max_delay = 0.75;
        config.delay_floor = 0.05;

        let policy = DelayPolicy::from_config(&config);
        assert_eq!(policy.min(), Duration::from_millis(250));
        assert_eq!(policy.max(), Duration::from_millis(750));
        assert_eq!(policy.floor(), Duration::from_millis(50));
    }
}
