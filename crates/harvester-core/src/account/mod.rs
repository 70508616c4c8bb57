//! Reddit account pool management: health-biased selection, rate-limit and
//! cooldown tracking.

pub use crate::storage::accounts::AccountRecord;

use crate::error::StorageError;
use crate::storage::memory::InMemoryStore;
use crate::storage::{accounts, DbPool};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Persistence seam for Reddit account health state.
#[async_trait]
pub trait AccountPort: Send + Sync {
    async fn list_all(&self) -> Result<Vec<AccountRecord>, StorageError>;
    async fn record_success(&self, username: &str) -> Result<(), StorageError>;
    async fn record_failure(&self, username: &str, penalty: i32) -> Result<(), StorageError>;
    async fn mark_rate_limited(&self, username: &str, duration_minutes: i64) -> Result<(), StorageError>;
    async fn mark_cooldown(&self, username: &str, duration: Duration) -> Result<(), StorageError>;
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
impl AccountPort for PgAdapter {
    async fn list_all(&self) -> Result<Vec<AccountRecord>, StorageError> {
        accounts::list_all(&self.pool).await
    }

    async fn record_success(&self, username: &str) -> Result<(), StorageError> {
        accounts::record_success(&self.pool, username).await
    }

    async fn record_failure(&self, username: &str, penalty: i32) -> Result<(), StorageError> {
        accounts::record_failure(&self.pool, username, penalty).await
    }

    async fn mark_rate_limited(&self, username: &str, duration_minutes: i64) -> Result<(), StorageError> {
        accounts::mark_rate_limited(&self.pool, username, duration_minutes).await
    }

    async fn mark_cooldown(&self, username: &str, duration: Duration) -> Result<(), StorageError> {
        accounts::mark_cooldown(&self.pool, username, duration).await
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
impl AccountPort for InMemoryAdapter {
    async fn list_all(&self) -> Result<Vec<AccountRecord>, StorageError> {
        Ok(self.store.accounts.lock().unwrap().values().cloned().collect())
    }

    async fn record_success(&self, username: &str) -> Result<(), StorageError> {
        if let Some(acct) = self.store.accounts.lock().unwrap().get_mut(username) {
            acct.total_requests += 1;
            acct.consecutive_failures = 0;
            acct.health_score = (acct.health_score + 1).min(100);
            acct.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_failure(&self, username: &str, penalty: i32) -> Result<(), StorageError> {
        if let Some(acct) = self.store.accounts.lock().unwrap().get_mut(username) {
            acct.total_requests += 1;
            acct.failed_requests += 1;
            acct.consecutive_failures += 1;
            acct.health_score = (acct.health_score - penalty).max(0);
            acct.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_rate_limited(&self, username: &str, duration_minutes: i64) -> Result<(), StorageError> {
        if let Some(acct) = self.store.accounts.lock().unwrap().get_mut(username) {
            acct.rate_limit_hits += 1;
            acct.rate_limited_until = Some(Utc::now() + chrono::Duration::minutes(duration_minutes));
        }
        Ok(())
    }

    async fn mark_cooldown(&self, username: &str, duration: Duration) -> Result<(), StorageError> {
        if let Some(acct) = self.store.accounts.lock().unwrap().get_mut(username) {
            acct.cooldown_until = Some(
                Utc::now() + chrono::Duration::from_std(duration).unwrap_or_default(),
            );
        }
        Ok(())
    }
}

/// Selects the best available account: highest health score first, ties
/// broken by least-recently-used, matching the rotation policy recovered
/// from the scraper's account manager.
pub fn select_best(accounts: &[AccountRecord]) -> Option<&AccountRecord> {
    let now = Utc::now();
    accounts
        .iter()
        .filter(|a| a.is_available(now))
        .max_by(|a, b| {
            a.health_score
                .cmp(&b.health_score)
                .then_with(|| b.last_used_at.cmp(&a.last_used_at))
        })
}

/// Default failure penalty applied to an account's health score on a
/// request error; a 429 applies a steeper, separate penalty via
/// `mark_rate_limited` instead.
pub const FAILURE_HEALTH_PENALTY: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, health: i32, last_used_secs_ago: Option<i64>) -> AccountRecord {
        AccountRecord {
            username: username.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: None,
            is_active: true,
            health_score: health,
            consecutive_failures: 0,
            total_requests: 0,
            failed_requests: 0,
            rate_limit_hits: 0,
            rate_limited_until: None,
            cooldown_until: None,
            last_used_at: last_used_secs_ago.map(|s| Utc::now() - chrono::Duration::seconds(s)),
        }
    }

    #[test]
    fn selects_highest_health_score() {
        let accounts = vec![account("a", 50, Some(10)), account("b", 90, Some(10))];
        assert_eq!(select_best(&accounts).unwrap().username, "b");
    }

    #[test]
    fn ties_broken_by_least_recently_used() {
        let accounts = vec![account("a", 80, Some(5)), account("b", 80, Some(500))];
        assert_eq!(select_best(&accounts).unwrap().username, "b");
    }

    #[test]
    fn rate_limited_accounts_are_excluded() {
        let mut limited = account("a", 100, Some(1));
        limited.rate_limited_until = Some(Utc::now() + chrono::Duration::minutes(5));
        let accounts = vec![limited, account("b", 10, Some(1))];
        assert_eq!(select_best(&accounts).unwrap().username, "b");
    }

    #[test]
    fn no_available_accounts_returns_none() {
        let mut inactive = account("a", 100, None);
        inactive.is_active = false;
        assert!(select_best(&[inactive]).is_none());
    }
}
