//! Typed configuration structures.
//!
//! [`Config`] is assembled once at boot ([`super::load`]) and then treated
//! as frozen for the life of the process. Per-scraper runtime overrides
//! arrive only through `ControlRecord.config` and are applied at the next
//! cycle boundary -- never hot-reloaded into this struct.

use std::time::Duration;

/// Top-level frozen configuration record.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub reddit: RedditConfig,
    pub instagram: InstagramConfig,
    pub proxy: ProxyConfig,
    pub account: AccountConfig,
    pub media: MediaConfig,
    pub supervisor: SupervisorConfig,
}

/// External relational store connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    pub url: String,
    /// Maximum pool connections.
    pub max_connections: u32,
}

/// Reddit pipeline tuning.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    /// Pool of User-Agent strings rotated per request.
    pub user_agents: Vec<String>,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Max retry attempts for 429/5xx/network errors.
    pub max_retries: u32,
    /// Lowercase substrings that mark a subreddit Non-Related when found
    /// in its rules+description text.
    pub non_related_keywords: Vec<String>,
    /// Lowercase substrings that mark `verification_required = true`.
    pub verification_keywords: Vec<String>,
    /// How long since `last_scraped_at` before a subreddit is due again.
    pub refresh_after: Duration,
    /// `limit` for `/hot.json` discovery fetches.
    pub hot_limit: u32,
    /// `limit` for `/top.json?t=week` metric fetches.
    pub top_limit: u32,
    /// Whether the hot-posts discovery fetch (step 5 of §4.3) runs.
    pub discovery_enabled: bool,
    /// `limit` for `/user/{name}/submitted.json`.
    pub user_submitted_limit: u32,
}

/// Instagram pipeline tuning.
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub rapidapi_host: String,
    pub rapidapi_key: String,
    /// Token bucket rate, requests/second.
    pub requests_per_second: u32,
    /// Semaphore bound on concurrent creator fan-out.
    pub concurrency: usize,
    /// Wait between cycle completion and the next cycle start.
    pub cycle_wait: Duration,
    /// Optional cap on creators processed per cycle.
    pub batch_size: Option<u32>,
    /// Reels/posts fetch target for creators with no prior reels.
    pub new_creator_target: u32,
    /// Reels/posts fetch target for creators with prior reels.
    pub existing_creator_target: u32,
    /// Minimum play_count for viral consideration.
    pub viral_min_views: u64,
    /// Multiplier against `avg_views_per_reel_cached` for viral consideration.
    pub viral_multiplier: f64,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Max retry attempts for 429/empty-response/transient errors.
    pub max_retries: u32,
}

/// Proxy registry tuning.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// `consecutive_errors` threshold that auto-disables a proxy.
    pub disable_threshold: u32,
    /// Concurrency used by `ValidateAll`.
    pub validate_concurrency: usize,
    /// Per-proxy validation request timeout.
    pub validate_timeout: Duration,
    /// Coalescing window for persisting in-memory counters.
    pub persist_interval: Duration,
    /// Coalescing count for persisting in-memory counters.
    pub persist_every_n: u32,
}

/// Reddit account registry tuning.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Cooldown duration entered after repeated failures or a rate-limit signal.
    pub cooldown: Duration,
    /// Consecutive failures before cooldown is entered.
    pub max_consecutive_failures: u32,
    /// Health score floor below which an account is excluded from selection.
    pub min_health_score: u8,
}

/// Media ingest (R2/S3-compatible) tuning.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Whether the R2 ingest path is active; when false the CDN URL is kept as-is.
    pub enabled: bool,
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub public_url: String,
    pub max_retries: u32,
    pub image_timeout: Duration,
    pub video_timeout: Duration,
}

/// Supervisor loop tuning.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub heartbeat_interval: Duration,
    pub drain_deadline: Duration,
    pub stale_heartbeat_reddit: Duration,
    pub stale_heartbeat_instagram: Duration,
}
