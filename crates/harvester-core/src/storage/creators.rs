//! CRUD operations for the `creators` table (Instagram profiles).

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// An Instagram creator row, with rollup statistics recomputed after every
/// scrape of that creator's recent media .
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct CreatorRecord {
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub media_count: Option<i64>,
    pub is_verified: bool,
    pub is_private: bool,
    pub profile_pic_url: Option<String>,
    pub external_url: Option<String>,
    pub total_reels: i64,
    pub total_views: i64,
    pub avg_views_per_reel: f64,
    pub avg_engagement: f64,
    pub review: Option<String>,
    pub primary_category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub discovered_at: Option<DateTime<Utc>>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl CreatorRecord {
    /// Preserve operator-curated fields across a re-scrape, mirroring
    /// [`super::subreddits::SubredditRecord::merge_operator_fields`].
    pub fn merge_operator_fields(mut self, cached: Option<&CreatorRecord>) -> Self {
        if let Some(cached) = cached {
            self.primary_category = cached.primary_category.clone();
            self.tags = cached.tags.clone();
            if cached.review.is_some() {
                self.review = cached.review.clone();
            }
            self.discovered_at = cached.discovered_at;
            self.total_reels = cached.total_reels;
            self.total_views = cached.total_views;
            self.avg_views_per_reel = cached.avg_views_per_reel;
            self.avg_engagement = cached.avg_engagement;
        }
        self
    }
}

pub async fn get(pool: &DbPool, username: &str) -> Result<Option<CreatorRecord>, StorageError> {
    sqlx::query_as::<_, CreatorRecord>("SELECT * FROM creators WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)
}

/// Creators already tracked, used to split new-vs-existing targets for the
/// Instagram cycle's per-run budget.
pub async fn list_all(pool: &DbPool) -> Result<Vec<CreatorRecord>, StorageError> {
    sqlx::query_as::<_, CreatorRecord>("SELECT * FROM creators")
        .fetch_all(pool)
        .await
        .map_err(StorageError::from)
}

pub async fn upsert(pool: &DbPool, record: &CreatorRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO creators (
            username, full_name, biography, followers_count, following_count,
            media_count, is_verified, is_private, profile_pic_url, external_url,
            total_reels, total_views, avg_views_per_reel, avg_engagement, review, primary_category, tags,
            discovered_at, last_scraped_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
         ON CONFLICT (username) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            biography = EXCLUDED.biography,
            followers_count = EXCLUDED.followers_count,
            following_count = EXCLUDED.following_count,
            media_count = EXCLUDED.media_count,
            is_verified = EXCLUDED.is_verified,
            is_private = EXCLUDED.is_private,
            profile_pic_url = EXCLUDED.profile_pic_url,
            external_url = EXCLUDED.external_url,
            total_reels = EXCLUDED.total_reels,
            total_views = EXCLUDED.total_views,
            avg_views_per_reel = EXCLUDED.avg_views_per_reel,
            avg_engagement = EXCLUDED.avg_engagement,
            review = EXCLUDED.review,
            primary_category = EXCLUDED.primary_category,
            tags = EXCLUDED.tags,
            last_scraped_at = EXCLUDED.last_scraped_at",
    )
    .bind(&record.username)
    .bind(&record.full_name)
    .bind(&record.biography)
    .bind(record.followers_count)
    .bind(record.following_count)
    .bind(record.media_count)
    .bind(record.is_verified)
    .bind(record.is_private)
    .bind(&record.profile_pic_url)
    .bind(&record.external_url)
    .bind(record.total_reels)
    .bind(record.total_views)
    .bind(record.avg_views_per_reel)
    .bind(record.avg_engagement)
    .bind(&record.review)
    .bind(&record.primary_category)
    .bind(&record.tags)
    .bind(record.discovered_at)
    .bind(record.last_scraped_at)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(username: &str) -> CreatorRecord {
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
            last_scraped_at: None,
        }
    }

    #[test]
    fn merge_preserves_discovered_at_and_review() {
        let mut cached = base("creator1");
        cached.review = Some("Ok".to_string());
        cached.discovered_at = Some(Utc::now());

        let fresh = base("creator1");
        let merged = fresh.merge_operator_fields(Some(&cached));
        assert_eq!(merged.review.as_deref(), Some("Ok"));
        assert_eq!(merged.discovered_at, cached.discovered_at);
    }

    #[test]
    fn merge_preserves_rollups_from_cached() {
        let mut cached = base("creator1");
        cached.total_reels = 42;
        cached.total_views = 840_000;
        cached.avg_views_per_reel = 20_000.0;
        cached.avg_engagement = 0.05;

        let fresh = base("creator1");
        let merged = fresh.merge_operator_fields(Some(&cached));
        assert_eq!(merged.total_reels, 42);
        assert_eq!(merged.total_views, 840_000);
        assert_eq!(merged.avg_views_per_reel, 20_000.0);
        assert_eq!(merged.avg_engagement, 0.05);
    }
}
