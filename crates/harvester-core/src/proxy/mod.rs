//! Proxy pool management for the Reddit scraper: health tracking, thread
//! assignment, and periodic revalidation.
//!
//! Like [`crate::control`], the persistence seam is a narrow trait
//! ([`ProxyPort`]) with a Postgres and an in-memory implementation; the
//! validation HTTP logic lives in [`validator`] and is independent of which
//! adapter is in play.

pub mod validator;

pub use crate::storage::proxies::ProxyRecord;

use crate::error::StorageError;
use crate::storage::memory::InMemoryStore;
use crate::storage::{proxies, DbPool};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps a worker thread index to the proxy it should use for this cycle.
/// Built once per cycle by [`assign_threads`] from the current health-sorted
/// active proxy list.
pub type ThreadAssignment = HashMap<usize, i64>;

/// Persistence seam for proxy health state.
#[async_trait]
pub trait ProxyPort: Send + Sync {
    async fn load_active(&self) -> Result<Vec<ProxyRecord>, StorageError>;
    async fn record_result(&self, proxy_id: i64, success: bool, latency_ms: f64) -> Result<(), StorageError>;
    async fn disable(&self, proxy_id: i64, reason: &str) -> Result<(), StorageError>;
}

pub struct PgAdapter {
    pool: DbPool,
}

impl PgAdapter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProxyPort for PgAdapter {
    async fn load_active(&self) -> Result<Vec<ProxyRecord>, StorageError> {
        proxies::list_active(&self.pool).await
    }

    async fn record_result(&self, proxy_id: i64, success: bool, latency_ms: f64) -> Result<(), StorageError> {
        proxies::record_result(&self.pool, proxy_id, success, latency_ms).await
    }

    async fn disable(&self, proxy_id: i64, reason: &str) -> Result<(), StorageError> {
        proxies::disable(&self.pool, proxy_id, reason).await
    }
}

pub struct InMemoryAdapter {
    store: Arc<InMemoryStore>,
}

impl InMemoryAdapter {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProxyPort for InMemoryAdapter {
    async fn load_active(&self) -> Result<Vec<ProxyRecord>, StorageError> {
        let mut proxies: Vec<ProxyRecord> = self
            .store
            .proxies
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        crate::storage::proxies::sort_by_priority(&mut proxies);
        Ok(proxies)
    }

    async fn record_result(&self, proxy_id: i64, success: bool, latency_ms: f64) -> Result<(), StorageError> {
        let mut guard = self.store.proxies.lock().unwrap();
        if let Some(proxy) = guard.get_mut(&proxy_id) {
            proxy.total_requests += 1;
            if success {
                proxy.consecutive_errors = 0;
                proxy.avg_response_time_ms = (proxy.avg_response_time_ms * (proxy.total_requests - 1) as f64
                    + latency_ms)
                    / proxy.total_requests as f64;
            } else {
                proxy.failed_requests += 1;
                proxy.consecutive_errors += 1;
            }
        }
        Ok(())
    }

    async fn disable(&self, proxy_id: i64, reason: &str) -> Result<(), StorageError> {
        let mut guard = self.store.proxies.lock().unwrap();
        if let Some(proxy) = guard.get_mut(&proxy_id) {
            proxy.is_active = false;
            proxy.disabled_reason = Some(reason.to_string());
        }
        Ok(())
    }
}

/// Builds the thread-to-proxy map for one cycle: `T = Σ max_threads` over
/// the given (already priority-sorted) active proxies, with each proxy
/// claiming `max_threads` contiguous thread ids in that order. Every
/// `thread_id ∈ [0, T)` ends up mapped to exactly one proxy
/// (`ThreadAssignment`'s completeness invariant).
pub fn assign_threads(proxies: &[ProxyRecord]) -> ThreadAssignment {
    let mut assignment = ThreadAssignment::new();
    let mut thread_id = 0usize;
    for proxy in proxies {
        for _ in 0..proxy.max_threads.max(0) {
            assignment.insert(thread_id, proxy.id);
            thread_id += 1;
        }
    }
    assignment
}

/// Disable every active proxy whose `consecutive_errors` has crossed
/// `threshold`, matching the `error_threshold=20` default recovered from
/// the proxy manager this is descended from.
pub async fn disable_unhealthy(port: &dyn ProxyPort, threshold: i32) -> Result<usize, StorageError> {
    let active = port.load_active().await?;
    let mut disabled = 0;
    for proxy in active {
        if proxy.consecutive_errors >= threshold {
            port.disable(
                proxy.id,
                &format!("consecutive_errors={} >= threshold={}", proxy.consecutive_errors, threshold),
            )
            .await?;
            disabled += 1;
        }
    }
    Ok(disabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(id: i64, health_rank: f64) -> ProxyRecord {
        proxy_with_threads(id, health_rank, 0, 1)
    }

    fn proxy_with_threads(id: i64, health_rank: f64, priority: i32, max_threads: i32) -> ProxyRecord {
        ProxyRecord {
            id,
            host: "127.0.0.1".to_string(),
            port: 8080,
            protocol: "http".to_string(),
            username: None,
            password: None,
            priority,
            max_threads,
            is_active: true,
            consecutive_errors: 0,
            total_requests: 100,
            failed_requests: 0,
            avg_response_time_ms: 1000.0 - health_rank,
            last_validated_at: None,
            disabled_at: None,
            disabled_reason: None,
        }
    }

    #[test]
    fn assign_threads_allocates_contiguous_ids_per_proxy_in_order() {
        let proxies = vec![
            proxy_with_threads(1, 1.0, 10, 2),
            proxy_with_threads(2, 2.0, 5, 3),
        ];
        let assignment = assign_threads(&proxies);
        assert_eq!(assignment.len(), 5);
        assert_eq!(assignment[&0], 1);
        assert_eq!(assignment[&1], 1);
        assert_eq!(assignment[&2], 2);
        assert_eq!(assignment[&3], 2);
        assert_eq!(assignment[&4], 2);
    }

    #[test]
    fn assign_threads_empty_pool_yields_empty_assignment() {
        assert!(assign_threads(&[]).is_empty());
    }

    #[test]
    fn assign_threads_total_equals_sum_of_max_threads() {
        let proxies = vec![
            proxy_with_threads(1, 1.0, 0, 4),
            proxy_with_threads(2, 2.0, 0, 1),
            proxy_with_threads(3, 3.0, 0, 2),
        ];
        let expected: i32 = proxies.iter().map(|p| p.max_threads).sum();
        assert_eq!(assign_threads(&proxies).len(), expected as usize);
    }

    #[tokio::test]
    async fn disable_unhealthy_disables_only_over_threshold() {
        let store = Arc::new(InMemoryStore::new());
        let mut healthy = proxy(1, 1.0);
        healthy.consecutive_errors = 5;
        let mut unhealthy = proxy(2, 1.0);
        unhealthy.consecutive_errors = 25;
        store.proxies.lock().unwrap().insert(1, healthy);
        store.proxies.lock().unwrap().insert(2, unhealthy);

        let adapter = InMemoryAdapter::new(store.clone());
        let disabled = disable_unhealthy(&adapter, 20).await.unwrap();
        assert_eq!(disabled, 1);
        assert!(!store.proxies.lock().unwrap()[&2].is_active);
        assert!(store.proxies.lock().unwrap()[&1].is_active);
    }
}
