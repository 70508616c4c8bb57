//! Step 9's user pipeline: for each discovered username, walk
//! `about.json`/`submitted.json`, derive a full profile, merge it with the
//! cached row and upsert, and enqueue subreddits referenced in their
//! submission history that aren't already known. Budgeted per cycle like
//! [`super::verification`].

use super::client::RedditApiClient;
use super::cycle::RedditStore;
use super::user_profile;
use crate::error::RedditApiError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Walk the profile and submission history for up to `budget` undiscovered
/// users: derive and upsert their full [`crate::storage::users::UserRecord`],
/// and enqueue any subreddit referenced in their submissions as a name-only
/// stub row. Returns the number of distinct subreddit names newly enqueued.
pub async fn run_discovery_pass(
    store: &Arc<dyn RedditStore>,
    client: &RedditApiClient,
    budget: i64,
    submitted_limit: u32,
) -> usize {
    let candidates = match store.list_undiscovered_users(budget).await {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "failed to load undiscovered user candidates");
            return 0;
        }
    };

    let mut enqueued = 0;
    for user in candidates {
        let now = chrono::Utc::now();

        let about = match client.user_about(&user.username).await {
            Ok(about) => about,
            Err(RedditApiError::Forbidden { .. }) => {
                let cached = store.get_user(&user.username).await.ok().flatten();
                let record = user_profile::suspended_record(&user.username).merge_operator_fields(cached.as_ref());
                let _ = store.upsert_user(&record).await;
                let _ = store.mark_discovery_checked(&user.username).await;
                continue;
            }
            Err(RedditApiError::NotFound) => {
                let _ = store.mark_discovery_checked(&user.username).await;
                continue;
            }
            Err(e) => {
                debug!(username = user.username, error = %e, "profile fetch failed, will retry next cycle");
                continue;
            }
        };

        let mut subreddit_names: HashSet<String> = HashSet::new();
        let mut posts = Vec::new();
        match client.user_submitted(&user.username, submitted_limit).await {
            Ok(listing) => {
                subreddit_names = extract_subreddit_names(&listing);
                posts = user_profile::extract_submissions(&listing);
            }
            Err(RedditApiError::NotFound) | Err(RedditApiError::Forbidden { .. }) => {}
            Err(e) => {
                debug!(username = user.username, error = %e, "submission history fetch failed, profile derived without it");
            }
        }

        let cached = store.get_user(&user.username).await.ok().flatten();
        let record = user_profile::derive_profile(&user.username, &about, &posts, now).merge_operator_fields(cached.as_ref());
        let _ = store.upsert_user(&record).await;

        for name in subreddit_names {
            if store.enqueue_discovered_subreddit(&name).await.is_ok() {
                enqueued += 1;
            }
        }
        let _ = store.mark_discovery_checked(&user.username).await;
    }
    enqueued
}

fn extract_subreddit_names(listing: &serde_json::Value) -> HashSet<String> {
    listing["data"]["children"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|child| child["data"]["subreddit"].as_str())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_distinct_subreddit_names_from_listing() {
        let listing = serde_json::json!({
            "data": {
                "children": [
                    {"data": {"subreddit": "rust"}},
                    {"data": {"subreddit": "rust"}},
                    {"data": {"subreddit": "programming"}},
                ]
            }
        });
        let names = extract_subreddit_names(&listing);
        assert_eq!(names.len(), 2);
        assert!(names.contains("rust"));
        assert!(names.contains("programming"));
    }

    #[test]
    fn empty_listing_yields_no_names() {
        let listing = serde_json::json!({"data": {"children": []}});
        assert!(extract_subreddit_names(&listing).is_empty());
    }
}
