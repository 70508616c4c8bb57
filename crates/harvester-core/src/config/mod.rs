//! Configuration management for the harvester.
//!
//! Two-layer configuration loading:
//! 1. Built-in defaults
//! 2. Environment variable overrides (`HARVESTER_` prefix)
//!
//! The result is validated once and then treated as frozen; per-scraper
//! runtime overrides arrive only via `ControlRecord.config` and apply at
//! the next cycle boundary (see [`crate::control`]).

mod defaults;
mod env_overrides;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use types::{
    AccountConfig, Config, DatabaseConfig, InstagramConfig, MediaConfig, ProxyConfig,
    RedditConfig, SupervisorConfig,
};

use crate::error::ConfigError;

impl Config {
    /// Built-in defaults before any environment overrides are applied.
    pub fn defaults() -> Self {
        Config {
            database: DatabaseConfig {
                url: String::new(),
                max_connections: defaults::DEFAULT_DB_MAX_CONNECTIONS,
            },
            reddit: RedditConfig {
                user_agents: defaults::default_user_agents(),
                request_timeout: defaults::DEFAULT_REDDIT_REQUEST_TIMEOUT,
                max_retries: defaults::DEFAULT_REDDIT_MAX_RETRIES,
                non_related_keywords: defaults::default_non_related_keywords(),
                verification_keywords: defaults::default_verification_keywords(),
                refresh_after: defaults::DEFAULT_REDDIT_REFRESH_AFTER,
                hot_limit: defaults::DEFAULT_REDDIT_HOT_LIMIT,
                top_limit: defaults::DEFAULT_REDDIT_TOP_LIMIT,
                discovery_enabled: true,
                user_submitted_limit: defaults::DEFAULT_REDDIT_USER_SUBMITTED_LIMIT,
            },
            instagram: InstagramConfig {
                rapidapi_host: defaults::DEFAULT_INSTAGRAM_RAPIDAPI_HOST.to_string(),
                rapidapi_key: String::new(),
                requests_per_second: defaults::DEFAULT_INSTAGRAM_REQUESTS_PER_SECOND,
                concurrency: defaults::DEFAULT_INSTAGRAM_CONCURRENCY,
                cycle_wait: defaults::DEFAULT_INSTAGRAM_CYCLE_WAIT,
                batch_size: None,
                new_creator_target: defaults::DEFAULT_INSTAGRAM_NEW_CREATOR_TARGET,
                existing_creator_target: defaults::DEFAULT_INSTAGRAM_EXISTING_CREATOR_TARGET,
                viral_min_views: defaults::DEFAULT_INSTAGRAM_VIRAL_MIN_VIEWS,
                viral_multiplier: defaults::DEFAULT_INSTAGRAM_VIRAL_MULTIPLIER,
                request_timeout: defaults::DEFAULT_INSTAGRAM_REQUEST_TIMEOUT,
                max_retries: defaults::DEFAULT_INSTAGRAM_MAX_RETRIES,
            },
            proxy: ProxyConfig {
                disable_threshold: defaults::DEFAULT_PROXY_DISABLE_THRESHOLD,
                validate_concurrency: defaults::DEFAULT_PROXY_VALIDATE_CONCURRENCY,
                validate_timeout: defaults::DEFAULT_PROXY_VALIDATE_TIMEOUT,
                persist_interval: defaults::DEFAULT_PROXY_PERSIST_INTERVAL,
                persist_every_n: defaults::DEFAULT_PROXY_PERSIST_EVERY_N,
            },
            account: AccountConfig {
                cooldown: defaults::DEFAULT_ACCOUNT_COOLDOWN,
                max_consecutive_failures: defaults::DEFAULT_ACCOUNT_MAX_CONSECUTIVE_FAILURES,
                min_health_score: defaults::DEFAULT_ACCOUNT_MIN_HEALTH_SCORE,
            },
            media: MediaConfig {
                enabled: false,
                account_id: String::new(),
                access_key_id: String::new(),
                secret_access_key: String::new(),
                bucket_name: String::new(),
                public_url: String::new(),
                max_retries: defaults::DEFAULT_MEDIA_MAX_RETRIES,
                image_timeout: defaults::DEFAULT_MEDIA_IMAGE_TIMEOUT,
                video_timeout: defaults::DEFAULT_MEDIA_VIDEO_TIMEOUT,
            },
            supervisor: SupervisorConfig {
                heartbeat_interval: defaults::DEFAULT_SUPERVISOR_HEARTBEAT_INTERVAL,
                drain_deadline: defaults::DEFAULT_SUPERVISOR_DRAIN_DEADLINE,
                stale_heartbeat_reddit: defaults::DEFAULT_SUPERVISOR_STALE_HEARTBEAT_REDDIT,
                stale_heartbeat_instagram: defaults::DEFAULT_SUPERVISOR_STALE_HEARTBEAT_INSTAGRAM,
            },
        }
    }

    /// Load configuration: defaults, then environment overrides, then
    /// validation. This is the single entry point used by both binaries.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::defaults();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}
