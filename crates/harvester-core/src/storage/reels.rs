//! CRUD operations for the `reels` table (Instagram short-form video).

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// An Instagram reel row. Mirrors [`super::posts_ig::InstagramPostRecord`]
/// but carries `play_count` and `video_duration_seconds` instead of a
/// generic `media_type`, and uses the same viral-transition semantics.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ReelRecord {
    pub media_pk: String,
    pub creator_username: String,
    pub caption: Option<String>,
    pub play_count: Option<i64>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub video_duration_seconds: Option<f64>,
    pub taken_at: DateTime<Utc>,
    pub is_viral: bool,
    pub viral_detected_at: Option<DateTime<Utc>>,
    pub hashtags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub paid_partnership: bool,
    pub media_url: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

pub async fn get(pool: &DbPool, media_pk: &str) -> Result<Option<ReelRecord>, StorageError> {
    sqlx::query_as::<_, ReelRecord>("SELECT * FROM reels WHERE media_pk = $1")
        .bind(media_pk)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)
}

/// All reels stored for a creator, the source set for the rollup
/// recomputation in step 5: "update_creator_avg_views"
/// queries every stored reel, not just the page just fetched.
pub async fn list_for_creator(pool: &DbPool, creator_username: &str) -> Result<Vec<ReelRecord>, StorageError> {
    sqlx::query_as::<_, ReelRecord>("SELECT * FROM reels WHERE creator_username = $1")
        .bind(creator_username)
        .fetch_all(pool)
        .await
        .map_err(StorageError::from)
}

pub async fn upsert(pool: &DbPool, record: &ReelRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO reels (
            media_pk, creator_username, caption, play_count, like_count,
            comment_count, video_duration_seconds, taken_at, is_viral,
            viral_detected_at, hashtags, mentions, paid_partnership, media_url,
            last_updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
         ON CONFLICT (media_pk) DO UPDATE SET
            play_count = EXCLUDED.play_count,
            like_count = EXCLUDED.like_count,
            comment_count = EXCLUDED.comment_count,
            is_viral = EXCLUDED.is_viral,
            viral_detected_at = EXCLUDED.viral_detected_at,
            media_url = EXCLUDED.media_url,
            last_updated_at = EXCLUDED.last_updated_at",
    )
    .bind(&record.media_pk)
    .bind(&record.creator_username)
    .bind(&record.caption)
    .bind(record.play_count)
    .bind(record.like_count)
    .bind(record.comment_count)
    .bind(record.video_duration_seconds)
    .bind(record.taken_at)
    .bind(record.is_viral)
    .bind(record.viral_detected_at)
    .bind(&record.hashtags)
    .bind(&record.mentions)
    .bind(record.paid_partnership)
    .bind(&record.media_url)
    .bind(record.last_updated_at)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// A reel "goes viral" relative to the creator's own baseline rather than a
/// flat view count: `view_proxy >= avg_views * multiplier`, floored by the
/// absolute `min_views` gate so a brand-new creator with near-zero baseline
/// doesn't trivially qualify.
pub fn is_viral(play_count: i64, creator_avg_views: f64, min_views: i64, multiplier: f64) -> bool {
    if play_count < min_views {
        return false;
    }
    creator_avg_views <= 0.0 || (play_count as f64) >= creator_avg_views * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_absolute_floor_never_viral() {
        assert!(!is_viral(10_000, 1.0, 50_000, 5.0));
    }

    #[test]
    fn above_floor_and_multiplier_is_viral() {
        assert!(is_viral(300_000, 50_000.0, 50_000, 5.0));
    }

    #[test]
    fn above_floor_but_below_multiplier_is_not_viral() {
        assert!(!is_viral(100_000, 50_000.0, 50_000, 5.0));
    }

    #[test]
    fn zero_baseline_only_needs_the_absolute_floor() {
        assert!(is_viral(60_000, 0.0, 50_000, 5.0));
    }
}
