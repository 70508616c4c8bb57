//! CRUD operations for the `accounts` table (Reddit API credentials).

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// A Reddit API account row, tracking the rolling health signals used by
/// [`crate::account::AccountRegistry`]'s selection policy.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct AccountRecord {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    pub is_active: bool,
    pub health_score: i32,
    pub consecutive_failures: i32,
    pub total_requests: i64,
    pub failed_requests: i64,
    pub rate_limit_hits: i64,
    pub rate_limited_until: Option<DateTime<Utc>>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// Percentage of requests that succeeded, matching the formula carried
    /// over from the scraper's account manager: `(total - failed) / max(1, total) * 100`.
    pub fn success_rate(&self) -> f64 {
        (self.total_requests - self.failed_requests).max(0) as f64
            / (self.total_requests.max(1)) as f64
            * 100.0
    }

    /// Whether this account is currently usable, /// invariant: active, not mid-cooldown, not mid-rate-limit, and with
    /// a health score that hasn't dropped below the floor.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        const MIN_HEALTH_SCORE: i32 = 10;
        if !self.is_active {
            return false;
        }
        if self.health_score < MIN_HEALTH_SCORE {
            return false;
        }
        if let Some(until) = self.rate_limited_until {
            if until > now {
                return false;
            }
        }
        if let Some(until) = self.cooldown_until {
            if until > now {
                return false;
            }
        }
        true
    }
}

/// Load all accounts, regardless of availability -- callers filter with
/// [`AccountRecord::is_available`].
pub async fn list_all(pool: &DbPool) -> Result<Vec<AccountRecord>, StorageError> {
    sqlx::query_as::<_, AccountRecord>("SELECT * FROM accounts")
        .fetch_all(pool)
        .await
        .map_err(StorageError::from)
}

/// Record a successful request, resetting the failure streak and nudging
/// the health score back up (capped at 100).
pub async fn record_success(pool: &DbPool, username: &str) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE accounts SET
            total_requests = total_requests + 1,
            consecutive_failures = 0,
            health_score = LEAST(100, health_score + 1),
            last_used_at = now()
         WHERE username = $1",
    )
    .bind(username)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Record a failed request, incrementing the failure streak and lowering
/// the health score (floored at 0).
pub async fn record_failure(pool: &DbPool, username: &str, penalty: i32) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE accounts SET
            total_requests = total_requests + 1,
            failed_requests = failed_requests + 1,
            consecutive_failures = consecutive_failures + 1,
            health_score = GREATEST(0, health_score - $2),
            last_used_at = now()
         WHERE username = $1",
    )
    .bind(username)
    .bind(penalty)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Mark an account rate-limited for `duration_minutes`, matching the
/// account manager's `mark_rate_limited(duration_minutes=60)` default.
pub async fn mark_rate_limited(
    pool: &DbPool,
    username: &str,
    duration_minutes: i64,
) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE accounts SET
            rate_limit_hits = rate_limit_hits + 1,
            rate_limited_until = now() + make_interval(mins => $2)
         WHERE username = $1",
    )
    .bind(username)
    .bind(duration_minutes as i32)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Put an account into cooldown for `duration`, used after it exhausts its
/// `max_consecutive_failures` budget.
pub async fn mark_cooldown(
    pool: &DbPool,
    username: &str,
    duration: std::time::Duration,
) -> Result<(), StorageError> {
    let seconds = duration.as_secs() as i64;
    sqlx::query("UPDATE accounts SET cooldown_until = now() + make_interval(secs => $2) WHERE username = $1")
        .bind(username)
        .bind(seconds as i32)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn account(total: i64, failed: i64) -> AccountRecord {
        AccountRecord {
            username: "bot1".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: None,
            is_active: true,
            health_score: 100,
            consecutive_failures: 0,
            total_requests: total,
            failed_requests: failed,
            rate_limit_hits: 0,
            rate_limited_until: None,
            cooldown_until: None,
            last_used_at: None,
        }
    }

    #[test]
    fn success_rate_is_100_with_no_history() {
        assert_eq!(account(0, 0).success_rate(), 100.0);
    }

    #[test]
    fn success_rate_computes_correctly() {
        assert_eq!(account(10, 3).success_rate(), 70.0);
    }

    #[test]
    fn unavailable_while_rate_limited() {
        let mut acct = account(10, 0);
        let now = Utc::now();
        acct.rate_limited_until = Some(now + ChronoDuration::minutes(5));
        assert!(!acct.is_available(now));
    }

    #[test]
    fn available_after_rate_limit_expires() {
        let mut acct = account(10, 0);
        let now = Utc::now();
        acct.rate_limited_until = Some(now - ChronoDuration::minutes(1));
        assert!(acct.is_available(now));
    }

    #[test]
    fn inactive_account_is_never_available() {
        let mut acct = account(10, 0);
        acct.is_active = false;
        assert!(!acct.is_available(Utc::now()));
    }
}
