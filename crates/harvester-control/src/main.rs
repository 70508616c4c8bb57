//! Control-surface binary: binds an HTTP listener and serves the read-only
//! status routes backed by the same Postgres control-plane table the
//! Reddit/Instagram supervisors write to.

use std::sync::Arc;

use clap::Parser;
use harvester_control::state::AppState;
use harvester_core::config::Config;
use harvester_core::control::{CachingControlStore, PgAdapter};
use tracing_subscriber::EnvFilter;

/// Read-only HTTP status surface for the harvesting engine
#[derive(Parser)]
#[command(name = "harvester-control", version)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Host address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = Config::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    let pool = harvester_core::storage::init_db(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("database initialization failed: {e}"))?;

    let state = Arc::new(AppState {
        control: Arc::new(CachingControlStore::new(PgAdapter::new(pool))),
        stale_heartbeat_reddit: config.supervisor.stale_heartbeat_reddit,
        stale_heartbeat_instagram: config.supervisor.stale_heartbeat_instagram,
    });

    let router = harvester_control::build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", cli.host, cli.port)).await?;
    tracing::info!(host = %cli.host, port = cli.port, "control surface listening");
    axum::serve(listener, router).await?;

    Ok(())
}
