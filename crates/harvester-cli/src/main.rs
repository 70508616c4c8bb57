//! Harvester CLI - continuous Reddit/Instagram data acquisition engine.
//!
//! Entry point for the harvester binary. Parses CLI arguments,
//! initializes logging, and dispatches to subcommand handlers. Each
//! scraper is its own subcommand so a single process owns exactly one
//! scraper at a time -- there is no cluster coordinator.
mod commands;

use clap::Parser;
use harvester_core::config::Config;
use tracing_subscriber::EnvFilter;

/// Continuous Reddit/Instagram data acquisition engine
#[derive(Parser)]
#[command(name = "harvester")]
#[command(version)]
#[command(about = "Continuous Reddit/Instagram data acquisition engine")]
#[command(after_help = "\
Quick start:
  1. harvester status      — inspect the control plane for both scrapers
  2. harvester reddit      — run the Reddit scraper supervisor
  3. harvester instagram   — run the Instagram scraper supervisor")]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the Reddit scraper supervisor until shutdown
    Reddit(commands::reddit::RedditArgs),
    /// Run the Instagram scraper supervisor until shutdown
    Instagram(commands::instagram::InstagramArgs),
    /// Show control-plane status for both scrapers
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing-subscriber.
    //
    // Priority: RUST_LOG env var > --verbose/--quiet flags > default (info).
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("harvester=debug,harvester_core=debug,info")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("harvester=info,harvester_core=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .compact()
        .init();

    let config = Config::load().map_err(|e| {
        anyhow::anyhow!(
            "Failed to load configuration: {e}\n\
             Hint: set HARVESTER_DATABASE_URL (and friends) or populate a .env file."
        )
    })?;

    match cli.command {
        Commands::Reddit(args) => commands::reddit::execute(&config, args).await,
        Commands::Instagram(args) => commands::instagram::execute(&config, args).await,
        Commands::Status(args) => commands::status::execute(&config, args).await,
    }
}
