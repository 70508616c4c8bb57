//! Process-level runtime: owns the cancellation token shared by every
//! spawned scraper task and drains them on shutdown.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Manages concurrent task lifecycles for the harvester process. The
/// runtime owns a `CancellationToken` shared by all spawned tasks and
/// collects their `JoinHandle`s for graceful shutdown; it does not own
/// business dependencies itself.
pub struct Runtime {
    cancel: CancellationToken,
    handles: Vec<(String, JoinHandle<()>)>,
    drain_deadline: Duration,
}

impl Runtime {
    pub fn new(drain_deadline: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            handles: Vec::new(),
            drain_deadline,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn a task and track its handle. The task should check
    /// `CancellationToken::is_cancelled()` (or select on `.cancelled()`)
    /// to exit promptly when shutdown begins.
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        tracing::info!(task = %name, "spawning supervised task");
        let handle = tokio::spawn(future);
        self.handles.push((name, handle));
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Cancel every task and await them all, up to `drain_deadline`.
    pub async fn shutdown(&mut self) {
        tracing::info!("initiating graceful shutdown");
        self.cancel.cancel();

        let handles: Vec<_> = self.handles.drain(..).collect();
        let drain = async {
            for (name, handle) in handles {
                match handle.await {
                    Ok(()) => tracing::info!(task = %name, "task completed cleanly"),
                    Err(e) => tracing::warn!(task = %name, error = %e, "task panicked during shutdown"),
                }
            }
        };

        if tokio::time::timeout(self.drain_deadline, drain).await.is_err() {
            tracing::warn!(
                deadline_secs = self.drain_deadline.as_secs(),
                "shutdown deadline exceeded, some tasks may still be running"
            );
        } else {
            tracing::info!("graceful shutdown complete");
        }
    }

    /// Block until an OS shutdown signal arrives, then drain all tasks.
    pub async fn run_until_shutdown(mut self) {
        wait_for_shutdown_signal().await;
        self.shutdown().await;
    }
}

/// Wait for Ctrl+C or, on Unix, SIGTERM.
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler, using Ctrl+C only");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for Ctrl+C");
                } else {
                    tracing::info!("received Ctrl+C");
                }
                return;
            }
        };

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Ctrl+C handler error");
                }
                tracing::info!("received Ctrl+C");
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        } else {
            tracing::info!("received Ctrl+C");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn spawned_tasks_are_tracked_and_drained() {
        let mut runtime = Runtime::new(Duration::from_secs(5));
        let counter = Arc::new(AtomicU32::new(0));
        let cancel = runtime.cancel_token();
        let counter_clone = counter.clone();
        runtime.spawn("counter", async move {
            cancel.cancelled().await;
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runtime.task_count(), 1);
        runtime.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_warns_but_returns_on_deadline_exceeded() {
        let mut runtime = Runtime::new(Duration::from_millis(10));
        runtime.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        runtime.shutdown().await;
    }
}
