//! Configuration validation.

use super::Config;
use crate::error::ConfigError;

impl Config {
    /// Validate cross-field invariants after defaults + env overrides have
    /// been applied. Called once at boot; a failure here is a Fatal error
    /// (missing required config).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.reddit.user_agents.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "reddit.user_agents".to_string(),
                message: "must contain at least one entry".to_string(),
            });
        }
        if self.reddit.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reddit.max_retries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.instagram.rapidapi_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "instagram.rapidapi_key".to_string(),
            });
        }
        if self.instagram.requests_per_second == 0 {
            return Err(ConfigError::InvalidValue {
                field: "instagram.requests_per_second".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.instagram.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "instagram.concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.instagram.viral_multiplier <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "instagram.viral_multiplier".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.proxy.validate_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "proxy.validate_concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.account.min_health_score > 100 {
            return Err(ConfigError::InvalidValue {
                field: "account.min_health_score".to_string(),
                message: "must be at most 100".to_string(),
            });
        }

        if self.media.enabled {
            if self.media.bucket_name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "media.bucket_name".to_string(),
                });
            }
            if self.media.public_url.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "media.public_url".to_string(),
                });
            }
            if self.media.account_id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "media.account_id".to_string(),
                });
            }
            if self.media.access_key_id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "media.access_key_id".to_string(),
                });
            }
            if self.media.secret_access_key.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "media.secret_access_key".to_string(),
                });
            }
        }

        Ok(())
    }
}
