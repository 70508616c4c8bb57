//! Interval-with-jitter pacing for the supervisor's poll loop and for
//! inter-cycle waits, so two processes started at the same moment don't
//! poll the control table in lockstep forever.

use rand::Rng;
use std::time::Duration;

/// Sleeps for `interval + random_jitter` on each [`tick`](LoopScheduler::tick),
/// where `random_jitter` is drawn uniformly from `[min_delay, max_delay]`.
#[derive(Debug, Clone)]
pub struct LoopScheduler {
    interval: Duration,
    min_delay: Duration,
    max_delay: Duration,
}

impl LoopScheduler {
    /// If `min_delay > max_delay`, the values are swapped to prevent panics.
    pub fn new(interval: Duration, min_delay: Duration, max_delay: Duration) -> Self {
        let (actual_min, actual_max) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            tracing::warn!(
                min_ms = min_delay.as_millis() as u64,
                max_ms = max_delay.as_millis() as u64,
                "min_delay > max_delay, swapping values"
            );
            (max_delay, min_delay)
        };

        Self {
            interval,
            min_delay: actual_min,
            max_delay: actual_max,
        }
    }

    /// A scheduler with no jitter, useful for fixed heartbeat intervals.
    pub fn fixed(interval: Duration) -> Self {
        Self::new(interval, Duration::ZERO, Duration::ZERO)
    }

    pub fn next_delay(&self) -> Duration {
        let jitter = if self.min_delay == self.max_delay {
            self.min_delay
        } else {
            let min_ms = self.min_delay.as_millis() as u64;
            let max_ms = self.max_delay.as_millis() as u64;
            Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
        };
        self.interval + jitter
    }

    pub async fn tick(&self) {
        let delay = self.next_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "scheduler tick sleeping");
        tokio::time::sleep(delay).await;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_within_bounds() {
        let scheduler = LoopScheduler::new(
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(5),
        );
        for _ in 0..100 {
            let delay = scheduler.next_delay();
            assert!(delay >= Duration::from_secs(11));
            assert!(delay <= Duration::from_secs(15));
        }
    }

    #[test]
    fn fixed_scheduler_has_no_jitter() {
        let scheduler = LoopScheduler::fixed(Duration::from_secs(30));
        assert_eq!(scheduler.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn constructor_swaps_inverted_min_max() {
        let scheduler = LoopScheduler::new(
            Duration::from_secs(10),
            Duration::from_secs(5),
            Duration::from_secs(1),
        );
        assert!(scheduler.next_delay() >= Duration::from_secs(11));
        assert!(scheduler.next_delay() <= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn tick_completes() {
        let scheduler = LoopScheduler::fixed(Duration::from_millis(10));
        let start = tokio::time::Instant::now();
        scheduler.tick().await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
