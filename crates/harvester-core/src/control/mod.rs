//! The control plane: a shared table that lets an external operator pause,
//! resume, and observe each scraper without redeploying it, and a
//! structured system-log sink both scrapers and the HTTP surface read from.
//!
//! The [`ControlStore`] trait is the seam business logic depends on, with a
//! [`PgAdapter`] and an [`InMemoryAdapter`] behind it.

mod caching;

pub use caching::CachingControlStore;

use crate::error::ControlError;
use crate::storage::memory::InMemoryStore;
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use std::sync::Arc;

/// Lifecycle state of a scraper process, as observed by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScraperStatus {
    Idle,
    Running,
    Waiting,
    Stopped,
    Error,
}

impl ScraperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScraperStatus::Idle => "idle",
            ScraperStatus::Running => "running",
            ScraperStatus::Waiting => "waiting",
            ScraperStatus::Stopped => "stopped",
            ScraperStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "running" => ScraperStatus::Running,
            "waiting" => ScraperStatus::Waiting,
            "stopped" => ScraperStatus::Stopped,
            "error" => ScraperStatus::Error,
            _ => ScraperStatus::Idle,
        }
    }
}

/// One row of `system_control`, keyed by scraper name (`"reddit"` or
/// `"instagram"`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ControlRecord {
    pub scraper_name: String,
    pub status: ScraperStatus,
    pub is_enabled: bool,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub current_cycle_started_at: Option<DateTime<Utc>>,
    pub last_cycle_completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub config_overrides: Option<Json>,
}

impl ControlRecord {
    /// Default row for a scraper that has never been started:
    /// `ensure_exists` creates with `enabled=false` so a freshly-deployed
    /// scraper waits for an operator to flip it on.
    fn new_disabled(scraper_name: &str) -> Self {
        ControlRecord {
            scraper_name: scraper_name.to_string(),
            status: ScraperStatus::Idle,
            is_enabled: false,
            last_heartbeat_at: None,
            current_cycle_started_at: None,
            last_cycle_completed_at: None,
            last_error: None,
            config_overrides: None,
        }
    }

    /// A heartbeat older than `stale_after` means the process is presumed
    /// dead even though its row says `running` -- used by the HTTP status
    /// surface and by operator alerting, not by the scraper itself.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: std::time::Duration) -> bool {
        match self.last_heartbeat_at {
            Some(last) => (now - last).to_std().unwrap_or_default() > stale_after,
            None => self.status == ScraperStatus::Running,
        }
    }
}

/// A single structured log line emitted to `system_logs`, readable by the
/// HTTP `/status-detailed` endpoint and any external dashboard.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemLogEntry {
    pub scraper_name: String,
    pub level: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<Json>,
}

/// The port every scraper cycle and the HTTP control surface depend on.
#[async_trait]
pub trait ControlStore: Send + Sync {
    async fn load(&self, scraper_name: &str) -> Result<Option<ControlRecord>, ControlError>;

    /// Load the record, creating a default (enabled, idle) row if it does
    /// not exist yet -- called once at process start.
    async fn ensure_exists(&self, scraper_name: &str) -> Result<ControlRecord, ControlError>;

    async fn set_status(
        &self,
        scraper_name: &str,
        status: ScraperStatus,
        last_error: Option<String>,
    ) -> Result<(), ControlError>;

    async fn heartbeat(&self, scraper_name: &str) -> Result<(), ControlError>;

    async fn is_enabled(&self, scraper_name: &str) -> Result<bool, ControlError>;

    async fn log(&self, entry: SystemLogEntry) -> Result<(), ControlError>;
}

/// Postgres-backed [`ControlStore`].
pub struct PgAdapter {
    pool: DbPool,
}

impl PgAdapter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ControlStore for PgAdapter {
    async fn load(&self, scraper_name: &str) -> Result<Option<ControlRecord>, ControlError> {
        let row = sqlx::query(
            "SELECT scraper_name, status, is_enabled, last_heartbeat_at,
                    current_cycle_started_at, last_cycle_completed_at, last_error,
                    config_overrides
             FROM system_control WHERE scraper_name = $1",
        )
        .bind(scraper_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ControlError::WriteFailed {
            source: crate::error::StorageError::from(e),
        })?;

        use sqlx::Row;
        Ok(row.map(|row| ControlRecord {
            scraper_name: row.get("scraper_name"),
            status: ScraperStatus::from_str(row.get("status")),
            is_enabled: row.get("is_enabled"),
            last_heartbeat_at: row.get("last_heartbeat_at"),
            current_cycle_started_at: row.get("current_cycle_started_at"),
            last_cycle_completed_at: row.get("last_cycle_completed_at"),
            last_error: row.get("last_error"),
            config_overrides: row.get("config_overrides"),
        }))
    }

    async fn ensure_exists(&self, scraper_name: &str) -> Result<ControlRecord, ControlError> {
        if let Some(existing) = self.load(scraper_name).await? {
            return Ok(existing);
        }
        sqlx::query(
            "INSERT INTO system_control (scraper_name, status, is_enabled)
             VALUES ($1, 'idle', true)
             ON CONFLICT (scraper_name) DO NOTHING",
        )
        .bind(scraper_name)
        .execute(&self.pool)
        .await
        .map_err(|e| ControlError::WriteFailed {
            source: crate::error::StorageError::from(e),
        })?;
        Ok(self
            .load(scraper_name)
            .await?
            .unwrap_or_else(|| ControlRecord::new_disabled(scraper_name)))
    }

    async fn set_status(
        &self,
        scraper_name: &str,
        status: ScraperStatus,
        last_error: Option<String>,
    ) -> Result<(), ControlError> {
        sqlx::query(
            "UPDATE system_control SET status = $2, last_error = $3,
                current_cycle_started_at = CASE WHEN $2 = 'running' THEN now()
                    ELSE current_cycle_started_at END,
                last_cycle_completed_at = CASE WHEN $2 = 'idle' THEN now()
                    ELSE last_cycle_completed_at END
             WHERE scraper_name = $1",
        )
        .bind(scraper_name)
        .bind(status.as_str())
        .bind(last_error)
        .execute(&self.pool)
        .await
        .map_err(|e| ControlError::WriteFailed {
            source: crate::error::StorageError::from(e),
        })?;
        Ok(())
    }

    async fn heartbeat(&self, scraper_name: &str) -> Result<(), ControlError> {
        sqlx::query("UPDATE system_control SET last_heartbeat_at = now() WHERE scraper_name = $1")
            .bind(scraper_name)
            .execute(&self.pool)
            .await
            .map_err(|e| ControlError::WriteFailed {
                source: crate::error::StorageError::from(e),
            })?;
        Ok(())
    }

    async fn is_enabled(&self, scraper_name: &str) -> Result<bool, ControlError> {
        Ok(self
            .load(scraper_name)
            .await?
            .map(|r| r.is_enabled)
            .unwrap_or(true))
    }

    async fn log(&self, entry: SystemLogEntry) -> Result<(), ControlError> {
        sqlx::query(
            "INSERT INTO system_logs (scraper_name, level, message, created_at, metadata)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.scraper_name)
        .bind(&entry.level)
        .bind(&entry.message)
        .bind(entry.created_at)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| ControlError::WriteFailed {
            source: crate::error::StorageError::from(e),
        })?;
        Ok(())
    }
}

/// In-memory [`ControlStore`] used in tests.
pub struct InMemoryAdapter {
    store: Arc<InMemoryStore>,
}

impl InMemoryAdapter {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ControlStore for InMemoryAdapter {
    async fn load(&self, scraper_name: &str) -> Result<Option<ControlRecord>, ControlError> {
        Ok(self.store.control.lock().unwrap().get(scraper_name).cloned())
    }

    async fn ensure_exists(&self, scraper_name: &str) -> Result<ControlRecord, ControlError> {
        let mut guard = self.store.control.lock().unwrap();
        Ok(guard
            .entry(scraper_name.to_string())
            .or_insert_with(|| ControlRecord::new_disabled(scraper_name))
            .clone())
    }

    async fn set_status(
        &self,
        scraper_name: &str,
        status: ScraperStatus,
        last_error: Option<String>,
    ) -> Result<(), ControlError> {
        let mut guard = self.store.control.lock().unwrap();
        let record = guard
            .entry(scraper_name.to_string())
            .or_insert_with(|| ControlRecord::new_disabled(scraper_name));
        record.status = status;
        record.last_error = last_error;
        let now = Utc::now();
        if status == ScraperStatus::Running {
            record.current_cycle_started_at = Some(now);
        }
        if status == ScraperStatus::Idle {
            record.last_cycle_completed_at = Some(now);
        }
        Ok(())
    }

    async fn heartbeat(&self, scraper_name: &str) -> Result<(), ControlError> {
        let mut guard = self.store.control.lock().unwrap();
        let record = guard
            .entry(scraper_name.to_string())
            .or_insert_with(|| ControlRecord::new_disabled(scraper_name));
        record.last_heartbeat_at = Some(Utc::now());
        Ok(())
    }

    async fn is_enabled(&self, scraper_name: &str) -> Result<bool, ControlError> {
        Ok(self
            .store
            .control
            .lock()
            .unwrap()
            .get(scraper_name)
            .map(|r| r.is_enabled)
            .unwrap_or(true))
    }

    async fn log(&self, entry: SystemLogEntry) -> Result<(), ControlError> {
        self.store.system_logs.lock().unwrap().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_exists_creates_disabled_idle_row() {
        let adapter = InMemoryAdapter::new(Arc::new(InMemoryStore::new()));
        let record = adapter.ensure_exists("reddit").await.unwrap();
        assert!(!record.is_enabled);
        assert_eq!(record.status, ScraperStatus::Idle);
    }

    #[tokio::test]
    async fn set_status_running_stamps_cycle_start() {
        let adapter = InMemoryAdapter::new(Arc::new(InMemoryStore::new()));
        adapter.ensure_exists("reddit").await.unwrap();
        adapter
            .set_status("reddit", ScraperStatus::Running, None)
            .await
            .unwrap();
        let record = adapter.load("reddit").await.unwrap().unwrap();
        assert!(record.current_cycle_started_at.is_some());
    }

    #[test]
    fn stale_when_running_with_no_heartbeat() {
        let record = ControlRecord {
            status: ScraperStatus::Running,
            last_heartbeat_at: None,
            ..ControlRecord::new_disabled("reddit")
        };
        assert!(record.is_stale(Utc::now(), std::time::Duration::from_secs(300)));
    }

    #[test]
    fn not_stale_with_recent_heartbeat() {
        let record = ControlRecord {
            status: ScraperStatus::Running,
            last_heartbeat_at: Some(Utc::now()),
            ..ControlRecord::new_disabled("reddit")
        };
        assert!(!record.is_stale(Utc::now(), std::time::Duration::from_secs(300)));
    }
}
