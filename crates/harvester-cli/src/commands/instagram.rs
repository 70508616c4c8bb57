//! Implementation of the `harvester instagram` command.
//!
//! Wires the control plane, the RapidAPI client, the token bucket, and
//! the Instagram scraper cycle into a [`Supervisor`] and runs it until
//! shutdown.

use std::sync::Arc;

use harvester_core::config::Config;
use harvester_core::control::{CachingControlStore, ControlStore};
use harvester_core::instagram::cycle::InstagramStore;
use harvester_core::instagram::{InstagramApiClient, InstagramRunner, InstagramRunnerConfig, InstagramScraperCycle, TokenBucket};
use harvester_core::media::{MediaPipeline, MediaPipelineConfig};
use harvester_core::supervisor::{InterCycleState, Supervisor};

const SCRAPER_NAME: &str = "instagram";

#[derive(clap::Args)]
pub struct InstagramArgs {}

pub async fn execute(config: &Config, _args: InstagramArgs) -> anyhow::Result<()> {
    let pool = super::init_pool(config).await?;
    tracing::info!("database initialized");

    let control: Arc<dyn ControlStore> =
        Arc::new(CachingControlStore::new(harvester_core::control::PgAdapter::new(pool.clone())));
    let ig_store: Arc<dyn InstagramStore> = Arc::new(harvester_core::instagram::cycle::PgAdapter::new(pool.clone()));

    let client = Arc::new(
        InstagramApiClient::new(
            config.instagram.rapidapi_host.clone(),
            config.instagram.rapidapi_key.clone(),
            config.instagram.request_timeout,
        )
        .map_err(|e| anyhow::anyhow!("failed to build instagram client: {e}"))?,
    );
    let rate_limiter = Arc::new(TokenBucket::new(config.instagram.requests_per_second));

    let media = Arc::new(MediaPipeline::new(MediaPipelineConfig {
        enabled: config.media.enabled,
        account_id: config.media.account_id.clone(),
        access_key_id: config.media.access_key_id.clone(),
        secret_access_key: config.media.secret_access_key.clone(),
        bucket_name: config.media.bucket_name.clone(),
        public_url_base: config.media.public_url.clone(),
        max_retries: config.media.max_retries,
        image_timeout: config.media.image_timeout,
        video_timeout: config.media.video_timeout,
    }));

    let cycle = Arc::new(InstagramScraperCycle::new(
        ig_store.clone(),
        media,
        config.instagram.viral_min_views as i64,
        config.instagram.viral_multiplier,
        config.instagram.new_creator_target,
        config.instagram.existing_creator_target,
    ));

    let runner = InstagramRunner::new(
        ig_store,
        client,
        rate_limiter,
        cycle,
        InstagramRunnerConfig {
            concurrency: config.instagram.concurrency,
            batch_size: config.instagram.batch_size,
        },
    );

    // Instagram's inter-cycle gap is hours long (`cycle_wait`); the
    // supervisor surfaces it as `waiting` rather than folding it into
    // `idle` the way Reddit's poll-length gap is.
    let supervisor = Supervisor::new(
        SCRAPER_NAME,
        control,
        runner,
        config.instagram.cycle_wait,
        InterCycleState::Waiting,
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
