//! Shared retry/backoff helper used by the Reddit client, the Instagram
//! client, and database upserts.
//!
//! Each call site chooses a [`Backoff`] policy; the loop itself is generic
//! over the closure's error type so callers keep their own typed errors.

use std::future::Future;
use std::time::Duration;

/// A backoff policy: how long to wait before the `n`th retry (1-indexed).
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// `base * 2^(attempt-1)`, e.g. 1s, 2s, 4s for base=1s.
    Exponential { base: Duration, max_attempts: u32 },
    /// `base * attempt`, e.g. 0.5s, 1s, 1.5s for base=0.5s.
    Linear { base: Duration, max_attempts: u32 },
}

impl Backoff {
    fn max_attempts(&self) -> u32 {
        match self {
            Backoff::Exponential { max_attempts, .. } => *max_attempts,
            Backoff::Linear { max_attempts, .. } => *max_attempts,
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Exponential { base, .. } => base.saturating_mul(1 << (attempt - 1)),
            Backoff::Linear { base, .. } => base.saturating_mul(attempt),
        }
    }
}

/// Run `op` up to `policy.max_attempts()` times. `should_retry` decides,
/// given the error from an attempt, whether another attempt should be made.
/// Sleeps `policy.delay_for_attempt(n)` between attempts. Returns the last
/// error if all attempts are exhausted.
pub async fn with_backoff<T, E, F, Fut, R>(policy: Backoff, mut op: F, mut should_retry: R) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts() || !should_retry(&err) {
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn exponential_delays_double() {
        let policy = Backoff::Exponential {
            base: Duration::from_secs(1),
            max_attempts: 3,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn linear_delays_scale() {
        let policy = Backoff::Linear {
            base: Duration::from_millis(500),
            max_attempts: 3,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            Backoff::Exponential {
                base: Duration::from_millis(1),
                max_attempts: 3,
            },
            |_attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            Backoff::Exponential {
                base: Duration::from_millis(1),
                max_attempts: 5,
            },
            |_attempt| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(7)
                    }
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            Backoff::Linear {
                base: Duration::from_millis(1),
                max_attempts: 3,
            },
            |_attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("persistent") }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Err("persistent"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_when_should_retry_false() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            Backoff::Exponential {
                base: Duration::from_millis(1),
                max_attempts: 5,
            },
            |_attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |_| false,
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
