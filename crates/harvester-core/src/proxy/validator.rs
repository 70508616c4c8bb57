//! Proxy revalidation: issue a cheap request through each proxy and record
//! the outcome, bounded to a small concurrency so the validation pass
//! itself doesn't look like abuse traffic to upstream.

use super::{ProxyPort, ProxyRecord};
use crate::error::StorageError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Endpoint used to confirm a proxy is alive and egressing correctly.
/// Cheap, stable, and doesn't count against Reddit's or Instagram's own
/// rate limits.
const VALIDATION_URL: &str = "https://httpbin.org/ip";

/// Build a `reqwest::Client` routed through a single proxy.
fn client_for(proxy: &ProxyRecord, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    let scheme = &proxy.protocol;
    let proxy_url = match (&proxy.username, &proxy.password) {
        (Some(user), Some(pass)) => {
            format!("{scheme}://{user}:{pass}@{}:{}", proxy.host, proxy.port)
        }
        _ => format!("{scheme}://{}:{}", proxy.host, proxy.port),
    };
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::all(proxy_url)?)
        .timeout(timeout)
        .build()
}

/// Validate a single proxy, returning whether it responded successfully
/// and the round-trip latency observed.
pub async fn validate_one(proxy: &ProxyRecord, timeout: Duration) -> (bool, f64) {
    let started = Instant::now();
    let outcome = match client_for(proxy, timeout) {
        Ok(client) => client
            .get(VALIDATION_URL)
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false),
        Err(_) => false,
    };
    (outcome, started.elapsed().as_secs_f64() * 1000.0)
}

/// Validate every active proxy with bounded concurrency and persist the
/// results through `port`. Matches the `validate_concurrency=2` default:
/// proxy validation runs in the background of an active scrape and should
/// never compete meaningfully with real traffic.
pub async fn validate_all(
    port: &dyn ProxyPort,
    concurrency: usize,
    timeout: Duration,
) -> Result<(), StorageError> {
    let active = port.load_active().await?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(active.len());

    for proxy in active {
        let permit = semaphore.clone().acquire_owned().await.unwrap();
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let (ok, latency_ms) = validate_one(&proxy, timeout).await;
            (proxy.id, ok, latency_ms)
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((proxy_id, ok, latency_ms)) => {
                if !ok {
                    warn!(proxy_id, "proxy validation failed");
                }
                port.record_result(proxy_id, ok, latency_ms).await?;
            }
            Err(join_err) => debug!(error = %join_err, "proxy validation task panicked"),
        }
    }
    Ok(())
}
