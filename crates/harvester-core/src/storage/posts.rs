//! CRUD operations for the `posts` table (Reddit submissions).

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// A Reddit post row, deduplicated by `reddit_id` #[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PostRecord {
    pub reddit_id: String,
    pub subreddit: String,
    pub author: Option<String>,
    pub title: String,
    pub selftext: Option<String>,
    pub url: Option<String>,
    pub permalink: String,
    pub score: i64,
    pub upvote_ratio: Option<f64>,
    pub num_comments: i64,
    pub created_utc: DateTime<Utc>,
    pub over_18: bool,
    pub is_video: bool,
    pub stickied: bool,
    pub media_url: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

/// Upsert a post on its natural key `reddit_id`. Score, comment count, and
/// `upvote_ratio` are always refreshed; immutable fields (author, title,
/// creation time) are only ever set on first insert.
pub async fn upsert(pool: &DbPool, record: &PostRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO posts (
            reddit_id, subreddit, author, title, selftext, url, permalink,
            score, upvote_ratio, num_comments, created_utc, over_18, is_video,
            stickied, media_url, last_updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
         ON CONFLICT (reddit_id) DO UPDATE SET
            score = EXCLUDED.score,
            upvote_ratio = EXCLUDED.upvote_ratio,
            num_comments = EXCLUDED.num_comments,
            stickied = EXCLUDED.stickied,
            last_updated_at = EXCLUDED.last_updated_at",
    )
    .bind(&record.reddit_id)
    .bind(&record.subreddit)
    .bind(&record.author)
    .bind(&record.title)
    .bind(&record.selftext)
    .bind(&record.url)
    .bind(&record.permalink)
    .bind(record.score)
    .bind(record.upvote_ratio)
    .bind(record.num_comments)
    .bind(record.created_utc)
    .bind(record.over_18)
    .bind(record.is_video)
    .bind(record.stickied)
    .bind(&record.media_url)
    .bind(record.last_updated_at)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Lookup used by the dedup guard before issuing a per-post API call.
pub async fn exists(pool: &DbPool, reddit_id: &str) -> Result<bool, StorageError> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM posts WHERE reddit_id = $1")
        .bind(reddit_id)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)?;
    Ok(row.is_some())
}
