//! Implementation of the `harvester status` command.
//!
//! Prints the control-plane row for each scraper: read-only, the same
//! information the HTTP control surface's `/status` route serves.

use harvester_core::control::{ControlStore, PgAdapter};

const SCRAPERS: [&str; 2] = ["reddit", "instagram"];

#[derive(clap::Args)]
pub struct StatusArgs {}

pub async fn execute(config: &harvester_core::config::Config, _args: StatusArgs) -> anyhow::Result<()> {
    let pool = super::init_pool(config).await?;
    let control = PgAdapter::new(pool.clone());

    eprintln!();
    eprintln!("=== Harvester Control Plane ===");
    eprintln!();

    for scraper in SCRAPERS {
        match control.load(scraper).await {
            Ok(Some(record)) => {
                eprintln!("--- {scraper} ---");
                eprintln!("  status:          {}", record.status.as_str());
                eprintln!("  enabled:         {}", record.is_enabled);
                eprintln!(
                    "  last heartbeat:  {}",
                    record
                        .last_heartbeat_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string())
                );
                let stale_after = if scraper == "instagram" {
                    config.supervisor.stale_heartbeat_instagram
                } else {
                    config.supervisor.stale_heartbeat_reddit
                };
                eprintln!(
                    "  stale:           {}",
                    record.is_stale(chrono::Utc::now(), stale_after)
                );
                if let Some(err) = &record.last_error {
                    eprintln!("  last error:      {err}");
                }
                eprintln!();
            }
            Ok(None) => {
                eprintln!("--- {scraper} ---");
                eprintln!("  no control row yet (scraper has never started)");
                eprintln!();
            }
            Err(e) => {
                eprintln!("--- {scraper} ---");
                eprintln!("  error loading status: {e}");
                eprintln!();
            }
        }
    }

    pool.close().await;
    Ok(())
}
