//! Postgres storage layer.
//!
//! Provides database initialization, connection pooling, and concrete
//! CRUD functions for every persisted entity. The external database is the
//! sole source of truth; the free functions here are thin,
//! typed wrappers over `sqlx` queries using the runtime `query`/`query_as`
//! calls (not the compile-time `query!` macros, since no live database is
//! assumed at build time).
//!
//! Business logic (the scraper cycles) never calls these functions
//! directly -- it depends on narrow port traits (`SubredditStore`,
//! `CreatorStore`, ...) defined alongside the cycle that uses them, and a
//! `PgAdapter` in this module implements those traits by delegating to the
//! functions below. An `InMemoryAdapter` implements the same traits for
//! tests, so cycle logic runs without a live Postgres instance.

pub mod accounts;
pub mod creators;
pub mod memory;
pub mod posts;
pub mod posts_ig;
pub mod proxies;
pub mod reels;
pub mod subreddits;
pub mod users;

use crate::error::StorageError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

/// Type alias for the Postgres connection pool.
pub type DbPool = sqlx::PgPool;

/// Initialize the Postgres connection pool and run embedded migrations.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<DbPool, StorageError> {
    let connect_options: PgConnectOptions = database_url
        .parse()
        .map_err(|e| StorageError::Connection {
            source: sqlx::Error::Configuration(Box::new(e)),
        })?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(300))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
        .map_err(|e| StorageError::Connection { source: e })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StorageError::Migration { source: e })?;

    Ok(pool)
}
