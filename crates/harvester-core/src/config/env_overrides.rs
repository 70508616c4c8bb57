//! Environment variable overrides for configuration.
//!
//! Variables use the `HARVESTER_` prefix with double underscores separating
//! nested keys (e.g. `HARVESTER_REDDIT__MAX_RETRIES`).

use super::Config;
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

impl Config {
    pub(super) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = env::var("HARVESTER_DATABASE__URL") {
            self.database.url = val;
        }
        if let Ok(val) = env::var("HARVESTER_DATABASE__MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env_u32("HARVESTER_DATABASE__MAX_CONNECTIONS", &val)?;
        }

        if let Ok(val) = env::var("HARVESTER_REDDIT__USER_AGENTS") {
            self.reddit.user_agents = split_csv(&val);
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__REQUEST_TIMEOUT_SECS") {
            self.reddit.request_timeout =
                Duration::from_secs(parse_env_u64("HARVESTER_REDDIT__REQUEST_TIMEOUT_SECS", &val)?);
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__MAX_RETRIES") {
            self.reddit.max_retries = parse_env_u32("HARVESTER_REDDIT__MAX_RETRIES", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__NON_RELATED_KEYWORDS") {
            self.reddit.non_related_keywords = split_csv(&val);
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__VERIFICATION_KEYWORDS") {
            self.reddit.verification_keywords = split_csv(&val);
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__REFRESH_AFTER_HOURS") {
            self.reddit.refresh_after =
                Duration::from_secs(parse_env_u64("HARVESTER_REDDIT__REFRESH_AFTER_HOURS", &val)? * 3600);
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__HOT_LIMIT") {
            self.reddit.hot_limit = parse_env_u32("HARVESTER_REDDIT__HOT_LIMIT", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__TOP_LIMIT") {
            self.reddit.top_limit = parse_env_u32("HARVESTER_REDDIT__TOP_LIMIT", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_REDDIT__DISCOVERY_ENABLED") {
            self.reddit.discovery_enabled = parse_env_bool("HARVESTER_REDDIT__DISCOVERY_ENABLED", &val)?;
        }

        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__RAPIDAPI_HOST") {
            self.instagram.rapidapi_host = val;
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__RAPIDAPI_KEY") {
            self.instagram.rapidapi_key = val;
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__REQUESTS_PER_SECOND") {
            self.instagram.requests_per_second =
                parse_env_u32("HARVESTER_INSTAGRAM__REQUESTS_PER_SECOND", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__CONCURRENCY") {
            self.instagram.concurrency =
                parse_env_u32("HARVESTER_INSTAGRAM__CONCURRENCY", &val)? as usize;
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__CYCLE_WAIT_HOURS") {
            self.instagram.cycle_wait =
                Duration::from_secs(parse_env_u64("HARVESTER_INSTAGRAM__CYCLE_WAIT_HOURS", &val)? * 3600);
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__BATCH_SIZE") {
            self.instagram.batch_size = Some(parse_env_u32("HARVESTER_INSTAGRAM__BATCH_SIZE", &val)?);
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__VIRAL_MIN_VIEWS") {
            self.instagram.viral_min_views = parse_env_u64("HARVESTER_INSTAGRAM__VIRAL_MIN_VIEWS", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_INSTAGRAM__VIRAL_MULTIPLIER") {
            self.instagram.viral_multiplier =
                parse_env_f64("HARVESTER_INSTAGRAM__VIRAL_MULTIPLIER", &val)?;
        }

        if let Ok(val) = env::var("HARVESTER_PROXY__DISABLE_THRESHOLD") {
            self.proxy.disable_threshold = parse_env_u32("HARVESTER_PROXY__DISABLE_THRESHOLD", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_PROXY__VALIDATE_CONCURRENCY") {
            self.proxy.validate_concurrency =
                parse_env_u32("HARVESTER_PROXY__VALIDATE_CONCURRENCY", &val)? as usize;
        }

        if let Ok(val) = env::var("HARVESTER_ACCOUNT__COOLDOWN_MINUTES") {
            self.account.cooldown =
                Duration::from_secs(parse_env_u64("HARVESTER_ACCOUNT__COOLDOWN_MINUTES", &val)? * 60);
        }
        if let Ok(val) = env::var("HARVESTER_ACCOUNT__MAX_CONSECUTIVE_FAILURES") {
            self.account.max_consecutive_failures =
                parse_env_u32("HARVESTER_ACCOUNT__MAX_CONSECUTIVE_FAILURES", &val)?;
        }

        if let Ok(val) = env::var("HARVESTER_MEDIA__ENABLED") {
            self.media.enabled = parse_env_bool("HARVESTER_MEDIA__ENABLED", &val)?;
        }
        if let Ok(val) = env::var("HARVESTER_MEDIA__ACCOUNT_ID") {
            self.media.account_id = val;
        }
        if let Ok(val) = env::var("HARVESTER_MEDIA__ACCESS_KEY_ID") {
            self.media.access_key_id = val;
        }
        if let Ok(val) = env::var("HARVESTER_MEDIA__SECRET_ACCESS_KEY") {
            self.media.secret_access_key = val;
        }
        if let Ok(val) = env::var("HARVESTER_MEDIA__BUCKET_NAME") {
            self.media.bucket_name = val;
        }
        if let Ok(val) = env::var("HARVESTER_MEDIA__PUBLIC_URL") {
            self.media.public_url = val;
        }

        if let Ok(val) = env::var("HARVESTER_SUPERVISOR__HEARTBEAT_INTERVAL_SECS") {
            self.supervisor.heartbeat_interval = Duration::from_secs(parse_env_u64(
                "HARVESTER_SUPERVISOR__HEARTBEAT_INTERVAL_SECS",
                &val,
            )?);
        }
        if let Ok(val) = env::var("HARVESTER_SUPERVISOR__DRAIN_DEADLINE_SECS") {
            self.supervisor.drain_deadline = Duration::from_secs(parse_env_u64(
                "HARVESTER_SUPERVISOR__DRAIN_DEADLINE_SECS",
                &val,
            )?);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Split a comma-separated string into trimmed, non-empty values.
pub(super) fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Parse an environment variable value as `u32`.
pub(super) fn parse_env_u32(var_name: &str, val: &str) -> Result<u32, ConfigError> {
    val.parse::<u32>().map_err(|_| ConfigError::EnvParse {
        var: var_name.to_string(),
        message: format!("'{val}' is not a valid u32"),
    })
}

/// Parse an environment variable value as `u64`.
pub(super) fn parse_env_u64(var_name: &str, val: &str) -> Result<u64, ConfigError> {
    val.parse::<u64>().map_err(|_| ConfigError::EnvParse {
        var: var_name.to_string(),
        message: format!("'{val}' is not a valid u64"),
    })
}

/// Parse an environment variable value as `f64`.
pub(super) fn parse_env_f64(var_name: &str, val: &str) -> Result<f64, ConfigError> {
    val.parse::<f64>().map_err(|_| ConfigError::EnvParse {
        var: var_name.to_string(),
        message: format!("'{val}' is not a valid f64"),
    })
}

/// Parse an environment variable value as a boolean.
///
/// Accepts: `true`, `false`, `1`, `0`, `yes`, `no` (case-insensitive).
pub(super) fn parse_env_bool(var_name: &str, val: &str) -> Result<bool, ConfigError> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::EnvParse {
            var: var_name.to_string(),
            message: format!("'{val}' is not a valid boolean (use true/false/1/0/yes/no)"),
        }),
    }
}
