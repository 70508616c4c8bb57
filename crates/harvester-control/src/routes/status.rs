//! Read-only control-plane status routes.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::{AppState, SCRAPERS};

/// `GET /status` -- one compact row per scraper: enough for a liveness
/// dashboard or an uptime monitor, nothing an operator needs to dig into.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let mut scrapers = Vec::with_capacity(SCRAPERS.len());
    for name in SCRAPERS {
        match state.control.load(name).await? {
            Some(record) => {
                let stale = record.is_stale(Utc::now(), state.stale_after(name));
                scrapers.push(json!({
                    "scraper_name": name,
                    "status": record.status.as_str(),
                    "enabled": record.is_enabled,
                    "stale": stale,
                }));
            }
            None => {
                scrapers.push(json!({
                    "scraper_name": name,
                    "status": "unknown",
                    "enabled": null,
                    "stale": null,
                }));
            }
        }
    }
    Ok(Json(json!({ "scrapers": scrapers })))
}

/// `GET /status-detailed` -- the full [`harvester_core::control::ControlRecord`]
/// for every scraper, plus the `stale` verdict the raw row can't express on
/// its own (it depends on the per-scraper `stale_heartbeat_*` threshold).
pub async fn status_detailed(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let mut scrapers = Vec::with_capacity(SCRAPERS.len());
    for name in SCRAPERS {
        match state.control.load(name).await? {
            Some(record) => {
                let stale = record.is_stale(Utc::now(), state.stale_after(name));
                let mut entry = serde_json::to_value(&record).unwrap_or_else(|_| json!({}));
                if let Value::Object(map) = &mut entry {
                    map.insert("stale".to_string(), json!(stale));
                }
                scrapers.push(entry);
            }
            None => {
                scrapers.push(json!({
                    "scraper_name": name,
                    "status": "unknown",
                }));
            }
        }
    }
    Ok(Json(json!({ "scrapers": scrapers })))
}
