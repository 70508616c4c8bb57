//! Integration tests for the control surface's read-only routes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use harvester_control::state::AppState;
use harvester_core::control::{ControlStore, InMemoryAdapter};
use harvester_core::storage::memory::InMemoryStore;
use tower::ServiceExt;

fn test_router(control: Arc<dyn ControlStore>) -> axum::Router {
    let state = Arc::new(AppState {
        control,
        stale_heartbeat_reddit: Duration::from_secs(300),
        stale_heartbeat_instagram: Duration::from_secs(3600),
    });
    harvester_control::build_router(state)
}

async fn get_json(router: axum::Router, path: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder().uri(path).body(Body::empty()).expect("build request");
    let response = router.oneshot(req).await.expect("send request");
    let status = response.status();
    let body = response.into_body().collect().await.expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&body.to_bytes()).expect("parse JSON");
    (status, json)
}

#[tokio::test]
async fn health_reports_ok_without_touching_the_store() {
    let store = Arc::new(InMemoryStore::new());
    let control: Arc<dyn ControlStore> = Arc::new(InMemoryAdapter::new(store));
    let (status, body) = get_json(test_router(control), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_reports_unknown_for_scrapers_with_no_control_row() {
    let store = Arc::new(InMemoryStore::new());
    let control: Arc<dyn ControlStore> = Arc::new(InMemoryAdapter::new(store));
    let (status, body) = get_json(test_router(control), "/status").await;
    assert_eq!(status, StatusCode::OK);
    let scrapers = body["scrapers"].as_array().expect("scrapers array");
    assert_eq!(scrapers.len(), 2);
    assert_eq!(scrapers[0]["status"], "unknown");
}

#[tokio::test]
async fn status_reflects_an_enabled_idle_scraper_once_it_has_started() {
    let store = Arc::new(InMemoryStore::new());
    let control: Arc<dyn ControlStore> = Arc::new(InMemoryAdapter::new(store));
    control.ensure_exists("reddit").await.expect("ensure reddit row");

    let (status, body) = get_json(test_router(control), "/status").await;
    assert_eq!(status, StatusCode::OK);
    let scrapers = body["scrapers"].as_array().expect("scrapers array");
    let reddit = scrapers.iter().find(|s| s["scraper_name"] == "reddit").expect("reddit row");
    assert_eq!(reddit["status"], "idle");
    assert_eq!(reddit["enabled"], true);
}

#[tokio::test]
async fn status_detailed_includes_the_stale_verdict() {
    let store = Arc::new(InMemoryStore::new());
    let control: Arc<dyn ControlStore> = Arc::new(InMemoryAdapter::new(store));
    control.ensure_exists("instagram").await.expect("ensure instagram row");

    let (status, body) = get_json(test_router(control), "/status-detailed").await;
    assert_eq!(status, StatusCode::OK);
    let scrapers = body["scrapers"].as_array().expect("scrapers array");
    let instagram = scrapers
        .iter()
        .find(|s| s["scraper_name"] == "instagram")
        .expect("instagram row");
    assert_eq!(instagram["stale"], false);
}
