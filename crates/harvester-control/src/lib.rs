//! Read-only HTTP control surface for the harvesting engine.
//!
//! Exposes `GET /status`, `/status-detailed`, `/health`, all backed by
//! [`harvester_core::control::ControlStore::load`]. Narrowed to the one
//! slice of the "out of scope" HTTP layer the core needs a contract for:
//! start/stop process spawning, review CRUD, and the AI tagging scripts
//! stay external collaborators this crate never touches.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/status", get(routes::status::status))
        .route("/status-detailed", get(routes::status::status_detailed));

    Router::new()
        .merge(api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
