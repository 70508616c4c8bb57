//! Shared application state for the control surface.

use std::sync::Arc;
use std::time::Duration;

use harvester_core::control::ControlStore;

/// The two scrapers this surface reports on, in display order.
pub const SCRAPERS: [&str; 2] = ["reddit", "instagram"];

pub struct AppState {
    pub control: Arc<dyn ControlStore>,
    pub stale_heartbeat_reddit: Duration,
    pub stale_heartbeat_instagram: Duration,
}

impl AppState {
    pub fn stale_after(&self, scraper_name: &str) -> Duration {
        if scraper_name == "instagram" {
            self.stale_heartbeat_instagram
        } else {
            self.stale_heartbeat_reddit
        }
    }
}
