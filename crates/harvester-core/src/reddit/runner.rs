//! Wires the Reddit proxy pool, the work-list builder, and the fan-out
//! workers into a single [`ScraperCycleRunner`] the [`crate::supervisor::Supervisor`]
//! can drive, mirroring how the platform's discovery/content loops are each
//! a thin struct of ports driven by an outer scheduler.

use super::client::RedditApiClient;
use super::cycle::{build_work_list, RedditScraperCycle, RedditStore, SubredditResult};
use super::discovery::run_discovery_pass;
use super::verification::run_verification_pass;
use super::workers::run_fanout;
use crate::proxy::{validator, ProxyPort};
use crate::supervisor::ScraperCycleRunner;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Per-cycle budget for step 9's verification pass: how many unverified
/// users get an `about.json` re-check before the cycle moves on, so a
/// large backlog never dominates a run (it's simply picked up next cycle).
const VERIFICATION_BUDGET: i64 = 50;

/// Per-cycle budget for step 9's discovery pass: how many undiscovered
/// authors' submission histories get walked before the cycle moves on.
const DISCOVERY_BUDGET: i64 = 50;

/// Configuration a [`RedditRunner`] needs beyond what's already baked into
/// its [`RedditScraperCycle`].
pub struct RedditRunnerConfig {
    pub user_agents: Vec<String>,
    pub request_timeout: Duration,
    pub refresh_batch_size: i64,
    /// How long since `last_scraped_at` before a subreddit is due again.
    pub refresh_after: Duration,
    pub discovery_enabled: bool,
    pub user_submitted_limit: u32,
    pub disable_threshold: u32,
    pub validate_concurrency: usize,
    pub validate_timeout: Duration,
}

/// Drives one Reddit cycle: validates the proxy pool (a hard precondition
/// -- Reddit does not start a cycle with any proxy
/// failing validation), disables unhealthy proxies, builds the ordered
/// work list, and fans it out across proxy-bound workers.
pub struct RedditRunner {
    store: Arc<dyn RedditStore>,
    proxy_port: Arc<dyn ProxyPort>,
    cycle: Arc<RedditScraperCycle>,
    config: RedditRunnerConfig,
}

impl RedditRunner {
    pub fn new(
        store: Arc<dyn RedditStore>,
        proxy_port: Arc<dyn ProxyPort>,
        cycle: Arc<RedditScraperCycle>,
        config: RedditRunnerConfig,
    ) -> Self {
        Self {
            store,
            proxy_port,
            cycle,
            config,
        }
    }

    /// Subreddits due for refresh, oldest-scraped first. Newly discovered
    /// subreddits (step 9) are name-only stub rows with a null
    /// `last_scraped_at`, so they already surface here ahead of every
    /// stale-but-known row -- no separate "discovered" tier is needed.
    async fn build_work_list(&self) -> Vec<String> {
        let refresh_before = chrono::Utc::now()
            - chrono::Duration::from_std(self.config.refresh_after).unwrap_or(chrono::Duration::zero());
        let due: Vec<String> = self
            .store
            .list_due_for_refresh(refresh_before, self.config.refresh_batch_size)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to load due-for-refresh subreddits");
                Vec::new()
            })
            .into_iter()
            .map(|r| r.name)
            .collect();

        build_work_list(due, Vec::new())
    }

    /// Step 9's discovery pass, run once per cycle through whichever proxy
    /// happens to sort first -- the same shape as
    /// [`Self::run_verification_pass`]. Walks recently-seen authors'
    /// submission history and enqueues referenced subreddits not already
    /// known, so they appear in next cycle's `build_work_list`.
    async fn run_discovery(&self, proxies: &[crate::proxy::ProxyRecord]) -> usize {
        if !self.config.discovery_enabled {
            return 0;
        }
        let Some(proxy) = proxies.first() else {
            return 0;
        };
        let proxy_url = format!("{}://{}:{}", proxy.protocol, proxy.host, proxy.port);
        let client = match RedditApiClient::new(&proxy_url, self.config.user_agents.clone(), self.config.request_timeout) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to build client for discovery pass");
                return 0;
            }
        };
        run_discovery_pass(&self.store, &client, DISCOVERY_BUDGET, self.config.user_submitted_limit).await
    }
}

#[async_trait]
impl ScraperCycleRunner for RedditRunner {
    async fn run_cycle(&self, cancel: &CancellationToken) -> Result<String, String> {
        validator::validate_all(
            self.proxy_port.as_ref(),
            self.config.validate_concurrency,
            self.config.validate_timeout,
        )
        .await
        .map_err(|e| format!("proxy validation pass failed: {e}"))?;

        crate::proxy::disable_unhealthy(self.proxy_port.as_ref(), self.config.disable_threshold as i32)
            .await
            .map_err(|e| format!("failed to disable unhealthy proxies: {e}"))?;

        let proxies = self
            .proxy_port
            .load_active()
            .await
            .map_err(|e| format!("failed to load active proxies: {e}"))?;

        if proxies.is_empty() {
            return Err("no working proxies, cannot start reddit cycle".to_string());
        }

        let work_list = self.build_work_list().await;
        if work_list.is_empty() {
            return Ok("no subreddits due for refresh or discovery".to_string());
        }

        let results = run_fanout(
            self.cycle.clone(),
            &proxies,
            self.proxy_port.clone(),
            self.config.user_agents.clone(),
            self.config.request_timeout,
            work_list,
            cancel.clone(),
        )
        .await;

        let (scraped, skipped, failed) = summarize(&results);

        let verified = self.run_verification_pass(&proxies).await;
        let discovered = self.run_discovery(&proxies).await;

        info!(scraped, skipped, failed, verified, discovered, "reddit cycle complete");
        Ok(format!(
            "scraped={scraped} skipped={skipped} failed={failed} verified={verified} discovered={discovered}"
        ))
    }
}

impl RedditRunner {
    /// Step 9's verification pass, run once per cycle through whichever
    /// proxy happens to sort first (any healthy proxy works; this isn't
    /// the thread-affinity fan-out, just a small housekeeping pass).
    async fn run_verification_pass(&self, proxies: &[crate::proxy::ProxyRecord]) -> usize {
        let Some(proxy) = proxies.first() else {
            return 0;
        };
        let proxy_url = format!("{}://{}:{}", proxy.protocol, proxy.host, proxy.port);
        let client = match RedditApiClient::new(&proxy_url, self.config.user_agents.clone(), self.config.request_timeout) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to build client for verification pass");
                return 0;
            }
        };
        run_verification_pass(&self.store, &client, VERIFICATION_BUDGET).await
    }
}

fn summarize(results: &[SubredditResult]) -> (usize, usize, usize) {
    let mut scraped = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for result in results {
        match result {
            SubredditResult::Scraped { .. } => scraped += 1,
            SubredditResult::Skipped { .. } => skipped += 1,
            SubredditResult::Failed { .. } => failed += 1,
        }
    }
    (scraped, skipped, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::cycle::InMemoryAdapter as RedditInMemoryAdapter;
    use crate::storage::memory::InMemoryStore;

    #[tokio::test]
    async fn run_cycle_reports_no_working_proxies_when_pool_empty() {
        let store = Arc::new(InMemoryStore::new());
        let reddit_store = Arc::new(RedditInMemoryAdapter::new(store.clone()));
        let proxy_port: Arc<dyn ProxyPort> = Arc::new(crate::proxy::InMemoryAdapter::new(store));
        let cycle = Arc::new(RedditScraperCycle::new(reddit_store.clone(), vec![], vec![], 25, 10));
        let runner = RedditRunner::new(
            reddit_store,
            proxy_port,
            cycle,
            RedditRunnerConfig {
                user_agents: vec!["test-agent".to_string()],
                request_timeout: Duration::from_secs(10),
                refresh_batch_size: 50,
                refresh_after: Duration::from_secs(24 * 3600),
                discovery_enabled: false,
                user_submitted_limit: 25,
                disable_threshold: 20,
                validate_concurrency: 2,
                validate_timeout: Duration::from_secs(1),
            },
        );

        let result = runner.run_cycle(&CancellationToken::new()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("no working proxies"));
    }
}
