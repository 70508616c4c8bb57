//! Reqwest-based Reddit JSON API client.
//!
//! Talks to Reddit's unauthenticated `.json` endpoints (not OAuth) through
//! a rotating proxy, mirroring the error-mapping and rate-limit-header
//! style the platform's X API client uses.

use super::cycle::should_retry;
use crate::error::RedditApiError;
use crate::retry::{with_backoff, Backoff};
use rand::seq::SliceRandom;
use std::time::Duration;

const BASE_URL: &str = "https://www.reddit.com";

/// 429s and 5xx/network errors back off 1s, 2s, 4s for up to 3 attempts
/// total, step 2. 403/404 are never retried.
const RETRY_POLICY: Backoff = Backoff::Exponential {
    base: Duration::from_secs(1),
    max_attempts: 3,
};

/// HTTP client for the Reddit JSON API, bound to a single proxy for the
/// lifetime of a worker.
pub struct RedditApiClient {
    client: reqwest::Client,
    user_agents: Vec<String>,
}

impl RedditApiClient {
    /// Build a client routed through `proxy_url` (`scheme://[user:pass@]host:port`).
    pub fn new(proxy_url: &str, user_agents: Vec<String>, timeout: Duration) -> Result<Self, RedditApiError> {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| RedditApiError::MalformedResponse {
            endpoint: "proxy-config".to_string(),
            message: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .build()
            .map_err(|e| RedditApiError::MalformedResponse {
                endpoint: "client-build".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client, user_agents })
    }

    fn random_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str())
            .unwrap_or("Mozilla/5.0")
    }

    /// Issue one GET, retrying 429/5xx/network failures with exponential
    /// backoff; 403/404 return immediately on the first attempt.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, RedditApiError> {
        with_backoff(
            RETRY_POLICY,
            |_attempt| self.get_json_once(path, query),
            should_retry,
        )
        .await
    }

    async fn get_json_once(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, RedditApiError> {
        let url = format!("{BASE_URL}{path}");
        let response = self
            .client
            .get(&url)
            .header("User-Agent", self.random_user_agent())
            .query(query)
            .send()
            .await
            .map_err(|e| RedditApiError::Transient { message: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            response.json::<serde_json::Value>().await.map_err(|e| RedditApiError::MalformedResponse {
                endpoint: path.to_string(),
                message: e.to_string(),
            })
        } else {
            Err(Self::classify_status(status.as_u16()))
        }
    }

    /// Map an HTTP status code to its error category :
    /// 403/404 are not retried by the caller, 429 and 5xx are.
    pub fn classify_status(status: u16) -> RedditApiError {
        match status {
            403 => RedditApiError::Forbidden {
                message: "subreddit is private, quarantined, or banned".to_string(),
            },
            404 => RedditApiError::NotFound,
            429 => RedditApiError::RateLimited,
            500..=599 => RedditApiError::Transient {
                message: format!("upstream returned {status}"),
            },
            other => RedditApiError::Transient {
                message: format!("unexpected status {other}"),
            },
        }
    }

    /// Fetch subreddit "about" metadata.
    pub async fn subreddit_about(&self, name: &str) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(&format!("/r/{name}/about.json"), &[]).await
    }

    /// Fetch subreddit rules.
    pub async fn subreddit_rules(&self, name: &str) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(&format!("/r/{name}/about/rules.json"), &[]).await
    }

    /// Fetch the `hot` listing for a subreddit.
    pub async fn subreddit_hot(&self, name: &str, limit: u32) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(&format!("/r/{name}/hot.json"), &[("limit", &limit.to_string())])
            .await
    }

    /// Fetch the `top` listing for a subreddit over the given time window
    /// (`"day"`, `"week"`, `"month"`, `"year"`, `"all"`).
    pub async fn subreddit_top(&self, name: &str, limit: u32, time: &str) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(
            &format!("/r/{name}/top.json"),
            &[("limit", &limit.to_string()), ("t", time)],
        )
        .await
    }

    /// Fetch a user's public profile (`about.json`).
    pub async fn user_about(&self, username: &str) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(&format!("/user/{username}/about.json"), &[]).await
    }

    /// Fetch a user's submitted posts.
    pub async fn user_submitted(&self, username: &str, limit: u32) -> Result<serde_json::Value, RedditApiError> {
        self.get_json(
            &format!("/user/{username}/submitted.json"),
            &[("limit", &limit.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_forbidden_and_not_found_as_non_retryable_categories() {
        assert!(matches!(
            RedditApiClient::classify_status(403),
            RedditApiError::Forbidden { .. }
        ));
        assert!(matches!(RedditApiClient::classify_status(404), RedditApiError::NotFound));
    }

    #[test]
    fn classifies_rate_limit_and_server_errors_as_transient() {
        assert!(matches!(RedditApiClient::classify_status(429), RedditApiError::RateLimited));
        assert!(matches!(
            RedditApiClient::classify_status(503),
            RedditApiError::Transient { .. }
        ));
    }
}
