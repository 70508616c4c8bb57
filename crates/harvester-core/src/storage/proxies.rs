//! CRUD operations for the `proxies` table.

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// A proxy row, tracking the rolling health signals used by
/// [`crate::proxy::ProxyRegistry`]'s scoring formula.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ProxyRecord {
    pub id: i64,
    pub host: String,
    pub port: i32,
    pub protocol: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Higher priority proxies are ordered first when building the
    /// thread-to-proxy `ThreadAssignment`.
    pub priority: i32,
    /// Number of concurrent worker threads this proxy may serve in one
    /// cycle; `T = Σ max_threads` over active proxies.
    pub max_threads: i32,
    pub is_active: bool,
    pub consecutive_errors: i32,
    pub total_requests: i64,
    pub failed_requests: i64,
    pub avg_response_time_ms: f64,
    pub last_validated_at: Option<DateTime<Utc>>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_reason: Option<String>,
}

impl ProxyRecord {
    /// Fraction of requests through this proxy that succeeded, in `[0, 100]`.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 100.0;
        }
        let succeeded = (self.total_requests - self.failed_requests).max(0) as f64;
        succeeded / self.total_requests as f64 * 100.0
    }

    /// Health score used to rank proxies for thread assignment: higher is
    /// healthier. Matches the weighting recovered from the proxy manager
    /// this component is descended from.
    pub fn health_score(&self) -> f64 {
        self.success_rate() - self.avg_response_time_ms / 100.0
            - (self.consecutive_errors as f64) * 10.0
    }
}

/// Load all proxies with `is_active = true`, ordered by descending priority
/// (the deterministic order `assign_threads` builds the thread map from),
/// ties broken by descending health.
pub async fn list_active(pool: &DbPool) -> Result<Vec<ProxyRecord>, StorageError> {
    let mut proxies: Vec<ProxyRecord> =
        sqlx::query_as::<_, ProxyRecord>("SELECT * FROM proxies WHERE is_active = true")
            .fetch_all(pool)
            .await
            .map_err(StorageError::from)?;
    sort_by_priority(&mut proxies);
    Ok(proxies)
}

pub fn sort_by_priority(proxies: &mut [ProxyRecord]) {
    proxies.sort_by(|a, b| {
        b.priority.cmp(&a.priority).then_with(|| {
            b.health_score().partial_cmp(&a.health_score()).unwrap_or(std::cmp::Ordering::Equal)
        })
    });
}

/// Record the outcome of a single request made through `proxy_id`,
/// updating the rolling average latency and consecutive-error streak.
pub async fn record_result(
    pool: &DbPool,
    proxy_id: i64,
    success: bool,
    latency_ms: f64,
) -> Result<(), StorageError> {
    if success {
        sqlx::query(
            "UPDATE proxies SET
                total_requests = total_requests + 1,
                consecutive_errors = 0,
                avg_response_time_ms = CASE
                    WHEN total_requests = 0 THEN $2
                    ELSE (avg_response_time_ms * total_requests + $2) / (total_requests + 1)
                END,
                last_validated_at = now()
             WHERE id = $1",
        )
        .bind(proxy_id)
        .bind(latency_ms)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
    } else {
        sqlx::query(
            "UPDATE proxies SET
                total_requests = total_requests + 1,
                failed_requests = failed_requests + 1,
                consecutive_errors = consecutive_errors + 1
             WHERE id = $1",
        )
        .bind(proxy_id)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
    }
    Ok(())
}

/// Mark a proxy disabled once its `consecutive_errors` crosses the
/// configured threshold.
pub async fn disable(pool: &DbPool, proxy_id: i64, reason: &str) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE proxies SET is_active = false, disabled_at = now(), disabled_reason = $2
         WHERE id = $1",
    )
    .bind(proxy_id)
    .bind(reason)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(total: i64, failed: i64, avg_ms: f64, consecutive_errors: i32) -> ProxyRecord {
        ProxyRecord {
            id: 1,
            host: "127.0.0.1".to_string(),
            port: 8080,
            protocol: "http".to_string(),
            username: None,
            password: None,
            priority: 0,
            max_threads: 1,
            is_active: true,
            consecutive_errors,
            total_requests: total,
            failed_requests: failed,
            avg_response_time_ms: avg_ms,
            last_validated_at: None,
            disabled_at: None,
            disabled_reason: None,
        }
    }

    fn make_proxy(id: i64, priority: i32) -> ProxyRecord {
        let mut p = proxy(100, 0, 50.0, 0);
        p.id = id;
        p.priority = priority;
        p
    }

    #[test]
    fn sort_by_priority_orders_descending_priority_then_health() {
        let mut proxies = vec![make_proxy(1, 0), make_proxy(2, 5), make_proxy(3, 5)];
        proxies[2].avg_response_time_ms = 10.0;
        sort_by_priority(&mut proxies);
        assert_eq!(proxies[0].id, 3);
        assert_eq!(proxies[1].id, 2);
        assert_eq!(proxies[2].id, 1);
    }

    #[test]
    fn success_rate_defaults_to_100_with_no_traffic() {
        assert_eq!(proxy(0, 0, 0.0, 0).success_rate(), 100.0);
    }

    #[test]
    fn success_rate_computes_correctly() {
        assert_eq!(proxy(100, 25, 0.0, 0).success_rate(), 75.0);
    }

    #[test]
    fn health_score_penalizes_latency_and_errors() {
        let healthy = proxy(100, 0, 100.0, 0);
        let unhealthy = proxy(100, 0, 100.0, 3);
        assert!(healthy.health_score() > unhealthy.health_score());
        assert_eq!(unhealthy.health_score(), healthy.health_score() - 30.0);
    }
}
