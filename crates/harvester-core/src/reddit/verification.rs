//! Step 9 of the subreddit pipeline: verification-status checks for
//! authors seen in communities that require verified posting, budgeted per
//! cycle so a backlog of unverified users never dominates a run.

use super::client::RedditApiClient;
use super::cycle::RedditStore;
use crate::error::RedditApiError;
use std::sync::Arc;
use tracing::debug;

/// Check verification status for up to `budget` unverified users, stopping
/// early on a non-retryable API error for a given user (their status is
/// simply rechecked next cycle).
pub async fn run_verification_pass(
    store: &Arc<dyn RedditStore>,
    client: &RedditApiClient,
    budget: i64,
) -> usize {
    let candidates = match store.list_unverified_users(budget).await {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "failed to load unverified user candidates");
            return 0;
        }
    };

    let mut checked = 0;
    for user in candidates {
        match client.user_about(&user.username).await {
            Ok(about) => {
                let is_verified = about["data"]["verified"].as_bool().unwrap_or(false);
                if store
                    .set_user_verification(&user.username, is_verified)
                    .await
                    .is_ok()
                {
                    checked += 1;
                }
            }
            Err(RedditApiError::NotFound) => {
                let _ = store.set_user_verification(&user.username, false).await;
                checked += 1;
            }
            Err(e) => {
                debug!(username = user.username, error = %e, "verification check failed, will retry next cycle");
            }
        }
    }
    checked
}
