//! Error types for the harvester core library.
//!
//! Each module has its own error enum to provide clear error boundaries.
//! The library uses `thiserror` for structured, typed errors.

/// Errors related to configuration loading, parsing, and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required configuration field is absent.
    #[error("missing required config field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration field has an unacceptable value.
    #[error("invalid value for config field '{field}': {message}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// A description of why the value is invalid.
        message: String,
    },

    /// Environment variable parse failure.
    #[error("failed to parse env var '{var}': {message}")]
    EnvParse {
        /// The environment variable name.
        var: String,
        /// A description of the parse failure.
        message: String,
    },
}

/// Errors from interacting with the external relational store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to establish or configure a database connection.
    #[error("database connection error: {source}")]
    Connection {
        /// The underlying sqlx error.
        #[source]
        source: sqlx::Error,
    },

    /// A query failed to execute.
    #[error("database query error: {source}")]
    Query {
        /// The underlying sqlx error.
        #[source]
        source: sqlx::Error,
    },

    /// Embedded migrations failed to apply.
    #[error("database migration error: {source}")]
    Migration {
        /// The underlying sqlx migration error.
        #[source]
        source: sqlx::migrate::MigrateError,
    },

    /// A write failed after exhausting its retry budget.
    #[error("write retries exhausted for {entity}: {message}")]
    RetriesExhausted {
        /// The entity that failed to persist (e.g. "subreddits").
        entity: String,
        /// The last observed error message.
        message: String,
    },
}

impl From<sqlx::Error> for StorageError {
    fn from(source: sqlx::Error) -> Self {
        StorageError::Query { source }
    }
}

/// Errors from interacting with the Reddit public JSON API.
#[derive(Debug, thiserror::Error)]
pub enum RedditApiError {
    /// HTTP 403 -- subreddit or user is private/suspended.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Detail extracted from the response, if any.
        message: String,
    },

    /// HTTP 404 -- subreddit or user does not exist.
    #[error("not found")]
    NotFound,

    /// HTTP 429 -- rate limited. Retried internally; surfaced only after
    /// retry exhaustion.
    #[error("rate limited")]
    RateLimited,

    /// Transient failure: network error, timeout, or 5xx. Retried internally.
    #[error("transient error: {message}")]
    Transient {
        /// Description of the transient condition.
        message: String,
    },

    /// No working proxies at cycle start -- fatal precondition failure.
    #[error("no working proxies available")]
    NoWorkingProxies,

    /// Response body did not match the expected schema.
    #[error("malformed response for {endpoint}: {message}")]
    MalformedResponse {
        /// The endpoint that returned the malformed body.
        endpoint: String,
        /// Parse failure detail.
        message: String,
    },
}

/// Errors from interacting with the Instagram RapidAPI gateway.
#[derive(Debug, thiserror::Error)]
pub enum InstagramApiError {
    /// HTTP 429 -- rate limited. Retried internally with jittered backoff.
    #[error("rate limited{}", match .retry_after { Some(s) => format!(", retry after {s}s"), None => String::new() })]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after: Option<u64>,
    },

    /// The API returned an empty `items` array. Retried once.
    #[error("empty items response")]
    EmptyResponse,

    /// Transient network or 5xx failure. Retried internally.
    #[error("transient error: {message}")]
    Transient {
        /// Description of the transient condition.
        message: String,
    },

    /// Non-retryable API error (4xx other than 429, malformed body, auth failure).
    #[error("API error (status {status}): {message}")]
    Fatal {
        /// HTTP status code, when available.
        status: u16,
        /// Error detail.
        message: String,
    },
}

/// Errors from the media download/upload pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Downloading the source media from the CDN failed.
    #[error("download failed for {url}: {message}")]
    DownloadFailed {
        /// The CDN URL that failed to download.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// Uploading to the R2/S3-compatible object store failed after retries.
    #[error("upload failed for key {key}: {message}")]
    UploadFailed {
        /// The object key that failed to upload.
        key: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors from interacting with the control-record store.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// No control record exists for the given scraper name.
    #[error("no control record for scraper '{0}'")]
    NotFound(String),

    /// A write to the control record failed (best-effort; caller should log
    /// and continue rather than propagate in hot paths).
    #[error("control record write failed: {source}")]
    WriteFailed {
        /// The underlying storage error.
        #[source]
        source: StorageError,
    },

    /// A single-run guard (e.g. related-creators discovery) is already held.
    #[error("operation '{0}' is already running")]
    AlreadyRunning(String),
}

impl From<StorageError> for ControlError {
    fn from(source: StorageError) -> Self {
        ControlError::WriteFailed { source }
    }
}
