//! RapidAPI-backed Instagram client. Unlike the Reddit client, every
//! request carries API-key headers rather than rotating through proxies,
//! and pagination is cursor-based via `max_id`.

use crate::error::InstagramApiError;
use rand::Rng;
use std::time::Duration;

/// Attempts for 429/empty-response retries, : 3 attempts
/// for rate limits, one extra retry for an empty `items` page.
const MAX_ATTEMPTS: u32 = 3;

/// HTTP client for a RapidAPI Instagram scraping endpoint.
pub struct InstagramApiClient {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

impl InstagramApiClient {
    pub fn new(host: String, api_key: String, timeout: Duration) -> Result<Self, InstagramApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InstagramApiError::Fatal {
                status: 0,
                message: e.to_string(),
            })?;
        Ok(Self { client, host, api_key })
    }

    /// Issue one GET, retrying 429s with 2-10s jittered backoff (up to
    /// [`MAX_ATTEMPTS`]) and an empty `items` response once. Any other
    /// error is surfaced on the first attempt.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, InstagramApiError> {
        let mut empty_retried = false;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.get_once(path, query).await {
                Ok(body) => return Ok(body),
                Err(InstagramApiError::EmptyResponse) if !empty_retried => {
                    empty_retried = true;
                    continue;
                }
                Err(InstagramApiError::RateLimited { retry_after }) if attempt < MAX_ATTEMPTS => {
                    let jitter = rand::thread_rng().gen_range(2.0..=10.0);
                    let delay = retry_after.map(|s| s as f64).unwrap_or(jitter);
                    tracing::debug!(attempt, delay_secs = delay, "instagram rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
                Err(InstagramApiError::Transient { .. }) if attempt < MAX_ATTEMPTS => continue,
                Err(e) => return Err(e),
            }
        }
        self.get_once(path, query).await
    }

    async fn get_once(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, InstagramApiError> {
        let url = format!("https://{}{}", self.host, path);
        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Host", &self.host)
            .header("X-RapidAPI-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| InstagramApiError::Transient { message: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| InstagramApiError::Transient { message: e.to_string() })?;
            if body.is_null() || body["data"]["items"].as_array().is_some_and(Vec::is_empty) {
                return Err(InstagramApiError::EmptyResponse);
            }
            Ok(body)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            Err(InstagramApiError::RateLimited { retry_after })
        } else if status.is_server_error() {
            Err(InstagramApiError::Transient {
                message: format!("upstream returned {status}"),
            })
        } else {
            Err(InstagramApiError::Fatal {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }

    pub async fn profile(&self, username: &str) -> Result<serde_json::Value, InstagramApiError> {
        self.get("/v1/info", &[("username_or_id_or_url", username)]).await
    }

    /// Fetch one page of a user's feed, optionally continuing from `max_id`.
    pub async fn user_feed(&self, user_id: &str, max_id: Option<&str>) -> Result<serde_json::Value, InstagramApiError> {
        let mut query = vec![("user_id", user_id)];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }
        self.get("/v1/medias", &query).await
    }

    /// Fetch one page of a user's reels, optionally continuing from `max_id`.
    pub async fn user_reels(&self, user_id: &str, max_id: Option<&str>) -> Result<serde_json::Value, InstagramApiError> {
        let mut query = vec![("user_id", user_id)];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }
        self.get("/v1/clips", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_construct_with_sane_timeout() {
        let client = InstagramApiClient::new(
            "instagram-api.example.com".to_string(),
            "key".to_string(),
            Duration::from_secs(30),
        );
        assert!(client.is_ok());
    }
}
