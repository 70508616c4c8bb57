//! Token-bucket rate limiter bounding outbound RapidAPI requests to a
//! configured requests-per-second ceiling, shared across every concurrent
//! creator task in a cycle.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A classic token bucket: capacity refills continuously at `rate` tokens
/// per second, up to `capacity`. `acquire` blocks (via sleeping) until a
/// token is available rather than rejecting the caller outright, since
/// every caller here genuinely needs to make the request eventually.
pub struct TokenBucket {
    capacity: f64,
    rate_per_sec: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(rate_per_sec: u32) -> Self {
        let capacity = rate_per_sec.max(1) as f64;
        Self {
            capacity,
            rate_per_sec: capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate_per_sec).min(self.capacity);
        state.last_refill = now;
    }

    /// Wait until a single token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().unwrap();
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - state.tokens;
                    Some(Duration::from_secs_f64(deficit / self.rate_per_sec))
                }
            };
            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_immediately_within_capacity() {
        let bucket = TokenBucket::new(10);
        let started = Instant::now();
        for _ in 0..10 {
            bucket.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn blocks_once_capacity_is_exhausted() {
        let bucket = TokenBucket::new(5);
        for _ in 0..5 {
            bucket.acquire().await;
        }
        let started = Instant::now();
        bucket.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
