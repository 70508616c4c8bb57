//! Wires the RapidAPI client, the token bucket, and semaphore-bounded
//! creator fan-out into a single [`ScraperCycleRunner`], the Instagram
//! counterpart to [`crate::reddit::runner::RedditRunner`].

use super::client::InstagramApiClient;
use super::cycle::{split_new_and_existing, CreatorResult, InstagramScraperCycle, InstagramStore};
use super::rate_limiter::TokenBucket;
use crate::supervisor::ScraperCycleRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Per-cycle creator targets, applying separate budgets for newly
/// discovered creators versus ones already scraped before.
pub struct InstagramRunnerConfig {
    pub concurrency: usize,
    pub batch_size: Option<u32>,
}

pub struct InstagramRunner {
    store: Arc<dyn InstagramStore>,
    client: Arc<InstagramApiClient>,
    rate_limiter: Arc<TokenBucket>,
    cycle: Arc<InstagramScraperCycle>,
    config: InstagramRunnerConfig,
}

impl InstagramRunner {
    pub fn new(
        store: Arc<dyn InstagramStore>,
        client: Arc<InstagramApiClient>,
        rate_limiter: Arc<TokenBucket>,
        cycle: Arc<InstagramScraperCycle>,
        config: InstagramRunnerConfig,
    ) -> Self {
        Self {
            store,
            client,
            rate_limiter,
            cycle,
            config,
        }
    }

    async fn build_targets(&self) -> Vec<String> {
        let all = self.store.list_creators().await.unwrap_or_default();
        let (new, existing) = split_new_and_existing(&all);

        let mut ordered: Vec<String> = existing
            .into_iter()
            .map(|c| c.username.clone())
            .chain(new.into_iter().map(|c| c.username.clone()))
            .collect();

        if let Some(limit) = self.config.batch_size {
            ordered.truncate(limit as usize);
        }
        ordered
    }
}

#[async_trait]
impl ScraperCycleRunner for InstagramRunner {
    async fn run_cycle(&self, _cancel: &CancellationToken) -> Result<String, String> {
        let targets = self.build_targets().await;
        if targets.is_empty() {
            return Ok("no creators due for refresh".to_string());
        }

        let results = self
            .cycle
            .run(
                self.client.clone(),
                self.rate_limiter.clone(),
                targets,
                self.config.concurrency,
            )
            .await;

        let (processed, skipped, failed) = summarize(&results);
        info!(processed, skipped, failed, "instagram cycle complete");
        Ok(format!("processed={processed} skipped={skipped} failed={failed}"))
    }
}

fn summarize(results: &[CreatorResult]) -> (usize, usize, usize) {
    let mut processed = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for result in results {
        match result {
            CreatorResult::Processed { .. } => processed += 1,
            CreatorResult::Skipped { .. } => skipped += 1,
            CreatorResult::Failed { .. } => failed += 1,
        }
    }
    (processed, skipped, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instagram::cycle::InMemoryAdapter as InstagramInMemoryAdapter;
    use crate::media::{MediaPipeline, MediaPipelineConfig};
    use crate::storage::memory::InMemoryStore;
    use std::time::Duration;

    fn disabled_media() -> Arc<MediaPipeline> {
        Arc::new(MediaPipeline::new(MediaPipelineConfig {
            enabled: false,
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: "test-bucket".to_string(),
            public_url_base: "https://cdn.example.com".to_string(),
            max_retries: 1,
            image_timeout: Duration::from_secs(5),
            video_timeout: Duration::from_secs(5),
        }))
    }

    #[tokio::test]
    async fn run_cycle_reports_no_creators_when_store_empty() {
        let store = Arc::new(InMemoryStore::new());
        let ig_store = Arc::new(InstagramInMemoryAdapter::new(store));
        let client = Arc::new(
            InstagramApiClient::new("host".to_string(), "key".to_string(), Duration::from_secs(10)).unwrap(),
        );
        let rate_limiter = Arc::new(TokenBucket::new(55));
        let cycle = Arc::new(InstagramScraperCycle::new(ig_store.clone(), disabled_media(), 50_000, 5.0, 90, 30));
        let runner = InstagramRunner::new(
            ig_store,
            client,
            rate_limiter,
            cycle,
            InstagramRunnerConfig {
                concurrency: 10,
                batch_size: None,
            },
        );

        let result = runner.run_cycle(&CancellationToken::new()).await.unwrap();
        assert_eq!(result, "no creators due for refresh");
    }
}
