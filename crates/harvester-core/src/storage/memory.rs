//! An in-process store used as the test double for every port trait in
//! [`crate::control`], [`crate::proxy`], [`crate::account`], [`crate::reddit`]
//! and [`crate::instagram`]. Each domain module defines its own narrow port
//! trait and implements it for [`InMemoryStore`] alongside the `PgAdapter`
//! implementation, so cycle logic can run against this store with no live
//! Postgres instance.

use super::accounts::AccountRecord;
use super::creators::CreatorRecord;
use super::posts::PostRecord;
use super::posts_ig::InstagramPostRecord;
use super::proxies::ProxyRecord;
use super::reels::ReelRecord;
use super::subreddits::SubredditRecord;
use super::users::UserRecord;
use std::collections::HashMap;
use std::sync::Mutex;

/// Plain in-memory tables, guarded by a single mutex each. No attempt is
/// made to model transactions or isolation levels -- tests that need that
/// run against a real Postgres instance instead.
#[derive(Default)]
pub struct InMemoryStore {
    pub subreddits: Mutex<HashMap<String, SubredditRecord>>,
    pub users: Mutex<HashMap<String, UserRecord>>,
    pub posts: Mutex<HashMap<String, PostRecord>>,
    pub creators: Mutex<HashMap<String, CreatorRecord>>,
    pub posts_ig: Mutex<HashMap<String, InstagramPostRecord>>,
    pub reels: Mutex<HashMap<String, ReelRecord>>,
    pub proxies: Mutex<HashMap<i64, ProxyRecord>>,
    pub accounts: Mutex<HashMap<String, AccountRecord>>,
    pub control: Mutex<HashMap<String, crate::control::ControlRecord>>,
    pub system_logs: Mutex<Vec<crate::control::SystemLogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = InMemoryStore::new();
        assert!(store.subreddits.lock().unwrap().is_empty());
        assert!(store.proxies.lock().unwrap().is_empty());
    }
}
