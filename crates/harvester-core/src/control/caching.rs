//! A thin decorator caching [`super::ControlStore::is_enabled`] for a short
//! window, so a tight poll loop doesn't hit the control table on every
//! iteration.

use super::{ControlStore, ScraperStatus, SystemLogEntry};
use crate::error::ControlError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(5);

struct Cached {
    value: bool,
    fetched_at: Instant,
}

/// Wraps any [`ControlStore`] and caches `is_enabled` results for up to
/// [`DEFAULT_TTL`] (5 seconds), matching the supervisor's 30s poll interval
/// decoupled from a tighter per-cycle enabled check.
pub struct CachingControlStore<S> {
    inner: S,
    cache: Mutex<Option<Cached>>,
    ttl: Duration,
}

impl<S: ControlStore> CachingControlStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(None),
            ttl: DEFAULT_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(None),
            ttl,
        }
    }
}

#[async_trait]
impl<S: ControlStore> ControlStore for CachingControlStore<S> {
    async fn load(&self, scraper_name: &str) -> Result<Option<super::ControlRecord>, ControlError> {
        self.inner.load(scraper_name).await
    }

    async fn ensure_exists(&self, scraper_name: &str) -> Result<super::ControlRecord, ControlError> {
        self.inner.ensure_exists(scraper_name).await
    }

    async fn set_status(
        &self,
        scraper_name: &str,
        status: ScraperStatus,
        last_error: Option<String>,
    ) -> Result<(), ControlError> {
        self.inner.set_status(scraper_name, status, last_error).await
    }

    async fn heartbeat(&self, scraper_name: &str) -> Result<(), ControlError> {
        self.inner.heartbeat(scraper_name).await
    }

    async fn is_enabled(&self, scraper_name: &str) -> Result<bool, ControlError> {
        {
            let guard = self.cache.lock().unwrap();
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.value);
                }
            }
        }
        let value = self.inner.is_enabled(scraper_name).await?;
        *self.cache.lock().unwrap() = Some(Cached {
            value,
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn log(&self, entry: SystemLogEntry) -> Result<(), ControlError> {
        self.inner.log(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::InMemoryAdapter;
    use crate::storage::memory::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn caches_is_enabled_within_ttl() {
        let store = Arc::new(InMemoryStore::new());
        let inner = InMemoryAdapter::new(store.clone());
        inner.ensure_exists("reddit").await.unwrap();
        let caching = CachingControlStore::with_ttl(inner, Duration::from_secs(60));

        assert!(caching.is_enabled("reddit").await.unwrap());

        caching
            .inner
            .set_status("reddit", ScraperStatus::Stopped, None)
            .await
            .unwrap();
        store
            .control
            .lock()
            .unwrap()
            .get_mut("reddit")
            .unwrap()
            .is_enabled = false;

        assert!(caching.is_enabled("reddit").await.unwrap());
    }

    #[tokio::test]
    async fn refetches_after_ttl_elapses() {
        let store = Arc::new(InMemoryStore::new());
        let inner = InMemoryAdapter::new(store.clone());
        inner.ensure_exists("reddit").await.unwrap();
        let caching = CachingControlStore::with_ttl(inner, Duration::from_millis(1));

        assert!(caching.is_enabled("reddit").await.unwrap());
        store.control.lock().unwrap().get_mut("reddit").unwrap().is_enabled = false;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!caching.is_enabled("reddit").await.unwrap());
    }
}
