//! Liveness check: always 200 once the process is accepting connections.
//! Deliberately does not touch the database -- a DB outage is reported by
//! `/status`, not by a process-level health probe.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
