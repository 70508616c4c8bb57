pub mod instagram;
pub mod reddit;
pub mod status;

use harvester_core::config::Config;
use harvester_core::storage::DbPool;

/// Initialize the Postgres pool shared by every subcommand.
pub async fn init_pool(config: &Config) -> anyhow::Result<DbPool> {
    harvester_core::storage::init_db(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("database initialization failed: {e}"))
}
