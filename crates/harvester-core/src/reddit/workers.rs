//! Thread-affinity worker fan-out: each worker is bound to a single proxy
//! for its lifetime (so a proxy's IP reputation accrues consistently)
//! and claims a disjoint slice of the work list round-robin.

use super::client::RedditApiClient;
use super::cycle::{RedditScraperCycle, SubredditResult};
use crate::proxy::{ProxyPort, ProxyRecord, ThreadAssignment};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Partition `work_list` into `thread_count` round-robin slices, so thread
/// `i` handles every `thread_count`-th subreddit.
fn partition(work_list: &[String], thread_count: usize) -> Vec<Vec<String>> {
    let mut slices = vec![Vec::new(); thread_count.max(1)];
    for (i, name) in work_list.iter().enumerate() {
        slices[i % thread_count.max(1)].push(name.clone());
    }
    slices
}

/// Run the full work list across `T = Σ proxy.max_threads` worker tasks,
/// each bound to the proxy [`crate::proxy::assign_threads`] picked for it.
/// Returns every subreddit's [`SubredditResult`] once all workers finish or
/// the cycle is cancelled.
pub async fn run_fanout(
    cycle: Arc<RedditScraperCycle>,
    proxies: &[ProxyRecord],
    proxy_port: Arc<dyn ProxyPort>,
    user_agents: Vec<String>,
    request_timeout: Duration,
    work_list: Vec<String>,
    cancel: CancellationToken,
) -> Vec<SubredditResult> {
    if proxies.is_empty() {
        warn!("no active proxies, reddit cycle has nothing to run with");
        return Vec::new();
    }

    let assignment: ThreadAssignment = crate::proxy::assign_threads(proxies);
    let thread_count = assignment.len();
    let slices = partition(&work_list, thread_count);
    let by_id: std::collections::HashMap<i64, &ProxyRecord> = proxies.iter().map(|p| (p.id, p)).collect();

    let mut handles = Vec::with_capacity(thread_count);
    for thread_id in 0..thread_count {
        let Some(&proxy_id) = assignment.get(&thread_id) else {
            continue;
        };
        let Some(proxy) = by_id.get(&proxy_id) else {
            continue;
        };
        let proxy_url = format!("{}://{}:{}", proxy.protocol, proxy.host, proxy.port);
        let cycle = cycle.clone();
        let work = slices[thread_id].clone();
        let cancel = cancel.clone();
        let user_agents = user_agents.clone();
        let proxy_port = proxy_port.clone();

        handles.push(tokio::spawn(async move {
            let client = match RedditApiClient::new(&proxy_url, user_agents, request_timeout) {
                Ok(c) => c,
                Err(e) => {
                    warn!(thread_id, error = %e, "failed to build reddit client for assigned proxy");
                    let _ = proxy_port.record_result(proxy_id, false, 0.0).await;
                    return Vec::new();
                }
            };
            run_one_worker(&cycle, &client, &work, proxy_id, &proxy_port, &cancel).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(mut partial) => results.append(&mut partial),
            Err(e) => warn!(error = %e, "reddit worker task panicked"),
        }
    }
    results
}

/// Process one worker's slice of the work list on its bound proxy,
/// recording per-request success/latency back to the proxy registry after
/// every subreddit.
async fn run_one_worker(
    cycle: &RedditScraperCycle,
    client: &RedditApiClient,
    work: &[String],
    proxy_id: i64,
    proxy_port: &Arc<dyn ProxyPort>,
    cancel: &CancellationToken,
) -> Vec<SubredditResult> {
    let mut results = Vec::with_capacity(work.len());
    for name in work {
        if cancel.is_cancelled() {
            debug!("reddit cycle cancelled, stopping before next subreddit");
            break;
        }
        let started = Instant::now();
        let result = cycle.process_subreddit(client, name).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let success = !matches!(result, SubredditResult::Failed { .. });
        if let Err(e) = proxy_port.record_result(proxy_id, success, latency_ms).await {
            debug!(proxy_id, error = %e, "failed to persist proxy result");
        }
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_distributes_round_robin() {
        let list: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let slices = partition(&list, 2);
        assert_eq!(slices[0], vec!["0", "2", "4"]);
        assert_eq!(slices[1], vec!["1", "3"]);
    }

    #[test]
    fn partition_with_single_thread_keeps_full_list() {
        let list: Vec<String> = (0..3).map(|i| i.to_string()).collect();
        let slices = partition(&list, 1);
        assert_eq!(slices[0], list);
    }
}
