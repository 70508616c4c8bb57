//! The Instagram scraper cycle: idle/running/waiting state machine driving
//! semaphore-bounded fan-out over creator targets.

use super::client::InstagramApiClient;
use super::extract;
use super::rollups;
use crate::error::{InstagramApiError, StorageError};
use crate::media::{MediaClass, MediaOutcome, MediaPipeline};
use crate::storage::creators::CreatorRecord;
use crate::storage::memory::InMemoryStore;
use crate::storage::posts_ig::{self, InstagramPostRecord};
use crate::storage::reels::{self, ReelRecord};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Lifecycle state of the Instagram cycle, mirrored into the control
/// plane's `ScraperStatus` by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
    /// Between cycles, sleeping out `cycle_wait` before the next pass.
    Waiting,
}

/// Storage seam for the Instagram cycle.
#[async_trait]
pub trait InstagramStore: Send + Sync {
    async fn get_creator(&self, username: &str) -> Result<Option<CreatorRecord>, StorageError>;
    async fn list_creators(&self) -> Result<Vec<CreatorRecord>, StorageError>;
    async fn upsert_creator(&self, record: &CreatorRecord) -> Result<(), StorageError>;
    async fn get_post(&self, media_pk: &str) -> Result<Option<InstagramPostRecord>, StorageError>;
    async fn upsert_post(&self, record: &InstagramPostRecord) -> Result<(), StorageError>;
    async fn get_reel(&self, media_pk: &str) -> Result<Option<ReelRecord>, StorageError>;
    async fn upsert_reel(&self, record: &ReelRecord) -> Result<(), StorageError>;
    async fn list_reels_for_creator(&self, username: &str) -> Result<Vec<ReelRecord>, StorageError>;
}

pub struct PgAdapter {
    pool: DbPool,
}

impl PgAdapter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstagramStore for PgAdapter {
    async fn get_creator(&self, username: &str) -> Result<Option<CreatorRecord>, StorageError> {
        crate::storage::creators::get(&self.pool, username).await
    }

    async fn list_creators(&self) -> Result<Vec<CreatorRecord>, StorageError> {
        crate::storage::creators::list_all(&self.pool).await
    }

    async fn upsert_creator(&self, record: &CreatorRecord) -> Result<(), StorageError> {
        crate::storage::creators::upsert(&self.pool, record).await
    }

    async fn get_post(&self, media_pk: &str) -> Result<Option<InstagramPostRecord>, StorageError> {
        posts_ig::get(&self.pool, media_pk).await
    }

    async fn upsert_post(&self, record: &InstagramPostRecord) -> Result<(), StorageError> {
        posts_ig::upsert(&self.pool, record).await
    }

    async fn get_reel(&self, media_pk: &str) -> Result<Option<ReelRecord>, StorageError> {
        reels::get(&self.pool, media_pk).await
    }

    async fn upsert_reel(&self, record: &ReelRecord) -> Result<(), StorageError> {
        reels::upsert(&self.pool, record).await
    }

    async fn list_reels_for_creator(&self, username: &str) -> Result<Vec<ReelRecord>, StorageError> {
        reels::list_for_creator(&self.pool, username).await
    }
}

pub struct InMemoryAdapter {
    store: Arc<InMemoryStore>,
}

impl InMemoryAdapter {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InstagramStore for InMemoryAdapter {
    async fn get_creator(&self, username: &str) -> Result<Option<CreatorRecord>, StorageError> {
        Ok(self.store.creators.lock().unwrap().get(username).cloned())
    }

    async fn list_creators(&self) -> Result<Vec<CreatorRecord>, StorageError> {
        Ok(self.store.creators.lock().unwrap().values().cloned().collect())
    }

    async fn upsert_creator(&self, record: &CreatorRecord) -> Result<(), StorageError> {
        self.store.creators.lock().unwrap().insert(record.username.clone(), record.clone());
        Ok(())
    }

    async fn get_post(&self, media_pk: &str) -> Result<Option<InstagramPostRecord>, StorageError> {
        Ok(self.store.posts_ig.lock().unwrap().get(media_pk).cloned())
    }

    async fn upsert_post(&self, record: &InstagramPostRecord) -> Result<(), StorageError> {
        self.store.posts_ig.lock().unwrap().insert(record.media_pk.clone(), record.clone());
        Ok(())
    }

    async fn get_reel(&self, media_pk: &str) -> Result<Option<ReelRecord>, StorageError> {
        Ok(self.store.reels.lock().unwrap().get(media_pk).cloned())
    }

    async fn upsert_reel(&self, record: &ReelRecord) -> Result<(), StorageError> {
        self.store.reels.lock().unwrap().insert(record.media_pk.clone(), record.clone());
        Ok(())
    }

    async fn list_reels_for_creator(&self, username: &str) -> Result<Vec<ReelRecord>, StorageError> {
        Ok(self
            .store
            .reels
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.creator_username == username)
            .cloned()
            .collect())
    }
}

/// Outcome of processing a single creator's targets this cycle.
#[derive(Debug)]
pub enum CreatorResult {
    Processed { username: String, new_media: usize },
    Skipped { username: String, reason: String },
    Failed { username: String, error: String },
}

/// Split the configured creator list into new (never scraped) and existing
/// targets, so the cycle can apply separate per-run budgets to each
/// (`new_creator_target` vs `existing_creator_target`).
pub fn split_new_and_existing(all: &[CreatorRecord]) -> (Vec<&CreatorRecord>, Vec<&CreatorRecord>) {
    all.iter().partition(|c| c.last_scraped_at.is_none())
}

pub struct InstagramScraperCycle {
    store: Arc<dyn InstagramStore>,
    media: Arc<MediaPipeline>,
    viral_min_views: i64,
    viral_multiplier: f64,
    new_creator_target: u32,
    existing_creator_target: u32,
}

impl InstagramScraperCycle {
    pub fn new(
        store: Arc<dyn InstagramStore>,
        media: Arc<MediaPipeline>,
        viral_min_views: i64,
        viral_multiplier: f64,
        new_creator_target: u32,
        existing_creator_target: u32,
    ) -> Self {
        Self {
            store,
            media,
            viral_min_views,
            viral_multiplier,
            new_creator_target,
            existing_creator_target,
        }
    }

    /// Process `targets` with up to `concurrency` creators in flight at
    /// once, matching the semaphore-bounded fan-out used for Instagram's
    /// per-account concurrency (distinct from Reddit's thread-affinity
    /// model, since there's no proxy pool to bind to here).
    pub async fn run(
        self: &Arc<Self>,
        client: Arc<InstagramApiClient>,
        rate_limiter: Arc<super::rate_limiter::TokenBucket>,
        targets: Vec<String>,
        concurrency: usize,
    ) -> Vec<CreatorResult> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut handles = Vec::with_capacity(targets.len());

        for username in targets {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let cycle = self.clone();
            let client = client.clone();
            let rate_limiter = rate_limiter.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                cycle.process_creator(&client, &rate_limiter, &username).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => warn!(error = %e, "instagram creator task panicked"),
            }
        }
        results
    }

    async fn process_creator(
        &self,
        client: &InstagramApiClient,
        rate_limiter: &super::rate_limiter::TokenBucket,
        username: &str,
    ) -> CreatorResult {
        let cached = self.store.get_creator(username).await.ok().flatten();
        let target = if cached.is_none() {
            self.new_creator_target
        } else {
            self.existing_creator_target
        };

        rate_limiter.acquire().await;
        let profile = match client.profile(username).await {
            Ok(p) => p,
            Err(InstagramApiError::Fatal { status: 404, .. }) => {
                return CreatorResult::Skipped {
                    username: username.to_string(),
                    reason: "profile not found".to_string(),
                }
            }
            Err(e) => {
                return CreatorResult::Failed {
                    username: username.to_string(),
                    error: e.to_string(),
                }
            }
        };

        let mut creator = parse_profile(username, &profile).merge_operator_fields(cached.as_ref());
        let user_id = profile["data"]["id"].as_str().unwrap_or_default().to_string();

        if let Some(source_url) = creator.profile_pic_url.clone() {
            creator.profile_pic_url = Some(
                match self.media.ingest(MediaClass::Profile, username, "profile_pic", None, &source_url).await {
                    MediaOutcome::Rehosted { public_url } => public_url,
                    MediaOutcome::KeptOriginal { original_url } => original_url,
                },
            );
        }

        let mut new_media = 0usize;
        let feed_items = self.paginate_feed(client, rate_limiter, &user_id, target).await;
        new_media += self.ingest_posts(username, &feed_items, creator.avg_views_per_reel).await;

        let reel_items = self.paginate_reels(client, rate_limiter, &user_id, target).await;
        new_media += self.ingest_reels(username, &reel_items, creator.avg_views_per_reel).await;

        if let Ok(all_reels) = self.store.list_reels_for_creator(username).await {
            let (total_reels, total_views, avg_views_per_reel, avg_engagement) = rollups::compute_rollups(&all_reels);
            creator.total_reels = total_reels;
            creator.total_views = total_views;
            creator.avg_views_per_reel = avg_views_per_reel;
            creator.avg_engagement = avg_engagement;
        }

        creator.last_scraped_at = Some(Utc::now());
        if cached.is_none() {
            creator.discovered_at = Some(Utc::now());
        }

        if let Err(e) = self.store.upsert_creator(&creator).await {
            return CreatorResult::Failed {
                username: username.to_string(),
                error: e.to_string(),
            };
        }

        CreatorResult::Processed {
            username: username.to_string(),
            new_media,
        }
    }

    /// Walk a user's feed page by page via `paging_info.max_id`, stopping
    /// once `target` items are collected, the upstream reports no more
    /// pages, or a page arrives with no continuation cursor.
    async fn paginate_feed(
        &self,
        client: &InstagramApiClient,
        rate_limiter: &super::rate_limiter::TokenBucket,
        user_id: &str,
        target: u32,
    ) -> Vec<serde_json::Value> {
        let mut items = Vec::new();
        let mut max_id: Option<String> = None;
        loop {
            rate_limiter.acquire().await;
            let page = match client.user_feed(user_id, max_id.as_deref()).await {
                Ok(page) => page,
                Err(_) => break,
            };
            let page_items = page["data"]["items"].as_array().cloned().unwrap_or_default();
            if page_items.is_empty() {
                break;
            }
            items.extend(page_items);
            let more_available = page["paging_info"]["more_available"].as_bool().unwrap_or(false);
            let next_max_id = page["paging_info"]["max_id"].as_str().map(|s| s.to_string());
            if items.len() as u32 >= target || !more_available || next_max_id.is_none() {
                break;
            }
            max_id = next_max_id;
        }
        items
    }

    /// Same pagination walk as [`Self::paginate_feed`], over reels.
    async fn paginate_reels(
        &self,
        client: &InstagramApiClient,
        rate_limiter: &super::rate_limiter::TokenBucket,
        user_id: &str,
        target: u32,
    ) -> Vec<serde_json::Value> {
        let mut items = Vec::new();
        let mut max_id: Option<String> = None;
        loop {
            rate_limiter.acquire().await;
            let page = match client.user_reels(user_id, max_id.as_deref()).await {
                Ok(page) => page,
                Err(_) => break,
            };
            let page_items = page["data"]["items"].as_array().cloned().unwrap_or_default();
            if page_items.is_empty() {
                break;
            }
            items.extend(page_items);
            let more_available = page["paging_info"]["more_available"].as_bool().unwrap_or(false);
            let next_max_id = page["paging_info"]["max_id"].as_str().map(|s| s.to_string());
            if items.len() as u32 >= target || !more_available || next_max_id.is_none() {
                break;
            }
            max_id = next_max_id;
        }
        items
    }

    async fn ingest_posts(&self, creator: &str, items: &[serde_json::Value], creator_avg_views: f64) -> usize {
        let mut stored = 0;
        for item in items {
            let Some(mut post) = parse_post(creator, item) else { continue };
            let cached = self.store.get_post(&post.media_pk).await.ok().flatten();
            let view_proxy = post.view_count.unwrap_or(0);
            let currently_viral =
                reels::is_viral(view_proxy, creator_avg_views, self.viral_min_views, self.viral_multiplier);
            let (is_viral, detected_at) = posts_ig::set_viral_state(
                cached.as_ref().and_then(|c| c.viral_detected_at),
                currently_viral,
                Utc::now(),
            );
            post.is_viral = is_viral;
            post.viral_detected_at = detected_at;
            if let Some(source_url) = post.media_url.clone() {
                let class = media_class_for_type(&post.media_type);
                post.media_url = Some(match self.media.ingest(class, creator, &post.media_pk, None, &source_url).await {
                    MediaOutcome::Rehosted { public_url } => public_url,
                    MediaOutcome::KeptOriginal { original_url } => original_url,
                });
            }
            if self.store.upsert_post(&post).await.is_ok() {
                stored += 1;
            }
        }
        stored
    }

    async fn ingest_reels(&self, creator: &str, items: &[serde_json::Value], creator_avg_views: f64) -> usize {
        let mut stored = 0;
        for item in items {
            let Some(mut reel) = parse_reel(creator, item) else { continue };
            let cached = self.store.get_reel(&reel.media_pk).await.ok().flatten();
            let play_count = reel.play_count.unwrap_or(0);
            let currently_viral =
                reels::is_viral(play_count, creator_avg_views, self.viral_min_views, self.viral_multiplier);
            let (is_viral, detected_at) = posts_ig::set_viral_state(
                cached.as_ref().and_then(|c| c.viral_detected_at),
                currently_viral,
                Utc::now(),
            );
            reel.is_viral = is_viral;
            reel.viral_detected_at = detected_at;
            if let Some(source_url) = reel.media_url.clone() {
                reel.media_url = Some(
                    match self.media.ingest(MediaClass::Video, creator, &reel.media_pk, None, &source_url).await {
                        MediaOutcome::Rehosted { public_url } => public_url,
                        MediaOutcome::KeptOriginal { original_url } => original_url,
                    },
                );
            }
            if self.store.upsert_reel(&reel).await.is_ok() {
                stored += 1;
            }
        }
        stored
    }
}

/// Instagram's `media_type` is `1` (image), `2` (video), or `8` (carousel,
/// whose cover is an image). Carousels only get their cover photo rehosted
/// here; the rest of the carousel isn't tracked by this pipeline.
fn media_class_for_type(media_type: &str) -> MediaClass {
    match media_type {
        "2" => MediaClass::Video,
        _ => MediaClass::Image,
    }
}

fn parse_profile(username: &str, profile: &serde_json::Value) -> CreatorRecord {
    let data = &profile["data"];
    CreatorRecord {
        username: username.to_string(),
        full_name: data["full_name"].as_str().map(|s| s.to_string()),
        biography: data["biography"].as_str().map(|s| s.to_string()),
        followers_count: data["follower_count"].as_i64(),
        following_count: data["following_count"].as_i64(),
        media_count: data["media_count"].as_i64(),
        is_verified: data["is_verified"].as_bool().unwrap_or(false),
        is_private: data["is_private"].as_bool().unwrap_or(false),
        profile_pic_url: data["profile_pic_url"].as_str().map(|s| s.to_string()),
        external_url: data["external_url"].as_str().map(|s| s.to_string()),
        total_reels: 0,
        total_views: 0,
        avg_views_per_reel: 0.0,
        avg_engagement: 0.0,
        review: None,
        primary_category: None,
        tags: None,
        discovered_at: None,
        last_scraped_at: None,
    }
}

fn parse_post(creator: &str, item: &serde_json::Value) -> Option<InstagramPostRecord> {
    let media_pk = item["pk"].as_str().or_else(|| item["id"].as_str())?.to_string();
    let caption = item["caption"]["text"].as_str().unwrap_or_default().to_string();
    let taken_at = item["taken_at"]
        .as_i64()
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))?;
    Some(InstagramPostRecord {
        media_pk,
        creator_username: creator.to_string(),
        caption: Some(caption.clone()),
        media_type: item["media_type"].as_i64().map(|t| t.to_string()).unwrap_or_default(),
        like_count: item["like_count"].as_i64(),
        comment_count: item["comment_count"].as_i64(),
        view_count: item["view_count"].as_i64().or_else(|| item["play_count"].as_i64()),
        taken_at,
        is_viral: false,
        viral_detected_at: None,
        hashtags: Some(extract::extract_hashtags(&caption)),
        mentions: Some(extract::extract_mentions(&caption)),
        paid_partnership: extract::is_paid_partnership(&caption),
        media_url: item["image_versions2"]["candidates"][0]["url"].as_str().map(|s| s.to_string()),
        last_updated_at: Utc::now(),
    })
}

fn parse_reel(creator: &str, item: &serde_json::Value) -> Option<ReelRecord> {
    let media_pk = item["pk"].as_str().or_else(|| item["id"].as_str())?.to_string();
    let caption = item["caption"]["text"].as_str().unwrap_or_default().to_string();
    let taken_at = item["taken_at"]
        .as_i64()
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))?;
    Some(ReelRecord {
        media_pk,
        creator_username: creator.to_string(),
        caption: Some(caption.clone()),
        play_count: item["play_count"].as_i64(),
        like_count: item["like_count"].as_i64(),
        comment_count: item["comment_count"].as_i64(),
        video_duration_seconds: item["video_duration"].as_f64(),
        taken_at,
        is_viral: false,
        viral_detected_at: None,
        hashtags: Some(extract::extract_hashtags(&caption)),
        mentions: Some(extract::extract_mentions(&caption)),
        paid_partnership: extract::is_paid_partnership(&caption),
        media_url: item["video_versions"][0]["url"].as_str().map(|s| s.to_string()),
        last_updated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(username: &str, scraped: bool) -> CreatorRecord {
        CreatorRecord {
            username: username.to_string(),
            full_name: None,
            biography: None,
            followers_count: None,
            following_count: None,
            media_count: None,
            is_verified: false,
            is_private: false,
            profile_pic_url: None,
            external_url: None,
            total_reels: 0,
            total_views: 0,
            avg_views_per_reel: 0.0,
            avg_engagement: 0.0,
            review: None,
            primary_category: None,
            tags: None,
            discovered_at: None,
            last_scraped_at: if scraped { Some(Utc::now()) } else { None },
        }
    }

    #[test]
    fn splits_new_from_existing_creators() {
        let creators = vec![creator("new1", false), creator("old1", true)];
        let (new, existing) = split_new_and_existing(&creators);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].username, "new1");
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].username, "old1");
    }

    #[test]
    fn parse_profile_reads_core_fields() {
        let json = serde_json::json!({
            "data": {"id": "123", "full_name": "Test Creator", "follower_count": 5000}
        });
        let record = parse_profile("testcreator", &json);
        assert_eq!(record.full_name.as_deref(), Some("Test Creator"));
        assert_eq!(record.followers_count, Some(5000));
    }
}
