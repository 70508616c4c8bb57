//! Implementation of the `harvester reddit` command.
//!
//! Wires the control plane, the proxy registry, and the Reddit scraper
//! cycle into a [`Supervisor`] and runs it until shutdown.

use std::sync::Arc;

use harvester_core::config::Config;
use harvester_core::control::{CachingControlStore, ControlStore};
use harvester_core::proxy::ProxyPort;
use harvester_core::reddit::cycle::RedditStore;
use harvester_core::reddit::{RedditRunner, RedditRunnerConfig, RedditScraperCycle};
use harvester_core::supervisor::{InterCycleState, Supervisor};

const SCRAPER_NAME: &str = "reddit";

#[derive(clap::Args)]
pub struct RedditArgs {}

pub async fn execute(config: &Config, _args: RedditArgs) -> anyhow::Result<()> {
    let pool = super::init_pool(config).await?;
    tracing::info!("database initialized");

    let control: Arc<dyn ControlStore> =
        Arc::new(CachingControlStore::new(harvester_core::control::PgAdapter::new(pool.clone())));
    let proxy_port: Arc<dyn ProxyPort> = Arc::new(harvester_core::proxy::PgAdapter::new(pool.clone()));
    let reddit_store: Arc<dyn RedditStore> = Arc::new(harvester_core::reddit::cycle::PgAdapter::new(pool.clone()));

    let cycle = Arc::new(RedditScraperCycle::new(
        reddit_store.clone(),
        config.reddit.non_related_keywords.clone(),
        config.reddit.verification_keywords.clone(),
        config.reddit.hot_limit,
        config.reddit.top_limit,
    ));

    let runner = RedditRunner::new(
        reddit_store,
        proxy_port,
        cycle,
        RedditRunnerConfig {
            user_agents: config.reddit.user_agents.clone(),
            request_timeout: config.reddit.request_timeout,
            refresh_batch_size: 100,
            refresh_after: config.reddit.refresh_after,
            discovery_enabled: config.reddit.discovery_enabled,
            user_submitted_limit: config.reddit.user_submitted_limit,
            disable_threshold: config.proxy.disable_threshold,
            validate_concurrency: config.proxy.validate_concurrency,
            validate_timeout: config.proxy.validate_timeout,
        },
    );

    // Reddit has no cycle_wait of its own (its pacing is the per-worker
    // rate limiting inside the fan-out); the supervisor folds its
    // inter-cycle gap back into `idle` rather than reporting `waiting`.
    let supervisor = Supervisor::new(
        SCRAPER_NAME,
        control,
        runner,
        config.supervisor.heartbeat_interval,
        InterCycleState::Idle,
    );

    let cancel = tokio_util::sync::CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        harvester_core::supervisor::runtime::wait_for_shutdown_signal().await;
        shutdown.cancel();
    });

    supervisor.run(cancel).await;
    pool.close().await;
    Ok(())
}
