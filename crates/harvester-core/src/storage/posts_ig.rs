//! CRUD operations for the `posts_ig` table (Instagram feed posts).

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// An Instagram post row, deduplicated by `media_pk`. Viral state follows
/// the monotonic-timestamp / non-monotonic-flag rule documented on
/// [`set_viral_state`].
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct InstagramPostRecord {
    pub media_pk: String,
    pub creator_username: String,
    pub caption: Option<String>,
    pub media_type: String,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub view_count: Option<i64>,
    pub taken_at: DateTime<Utc>,
    pub is_viral: bool,
    pub viral_detected_at: Option<DateTime<Utc>>,
    pub hashtags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub paid_partnership: bool,
    pub media_url: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

pub async fn get(pool: &DbPool, media_pk: &str) -> Result<Option<InstagramPostRecord>, StorageError> {
    sqlx::query_as::<_, InstagramPostRecord>("SELECT * FROM posts_ig WHERE media_pk = $1")
        .bind(media_pk)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)
}

pub async fn upsert(pool: &DbPool, record: &InstagramPostRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO posts_ig (
            media_pk, creator_username, caption, media_type, like_count,
            comment_count, view_count, taken_at, is_viral, viral_detected_at,
            hashtags, mentions, paid_partnership, media_url, last_updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
         ON CONFLICT (media_pk) DO UPDATE SET
            like_count = EXCLUDED.like_count,
            comment_count = EXCLUDED.comment_count,
            view_count = EXCLUDED.view_count,
            is_viral = EXCLUDED.is_viral,
            viral_detected_at = EXCLUDED.viral_detected_at,
            media_url = EXCLUDED.media_url,
            last_updated_at = EXCLUDED.last_updated_at",
    )
    .bind(&record.media_pk)
    .bind(&record.creator_username)
    .bind(&record.caption)
    .bind(&record.media_type)
    .bind(record.like_count)
    .bind(record.comment_count)
    .bind(record.view_count)
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

/// Apply the viral transition rule recovered from the dashboard's viral
/// detector: `is_viral` is recomputed fresh on every scrape (it can flip
/// back to `false` if a post falls below threshold after an engagement
/// spike), but `viral_detected_at` is set once on first transition to viral
/// and never cleared afterwards.
pub fn set_viral_state(
    cached_detected_at: Option<DateTime<Utc>>,
    currently_viral: bool,
    now: DateTime<Utc>,
) -> (bool, Option<DateTime<Utc>>) {
    let detected_at = match cached_detected_at {
        Some(ts) => Some(ts),
        None if currently_viral => Some(now),
        None => None,
    };
    (currently_viral, detected_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_transition_sets_timestamp() {
        let now = Utc::now();
        let (is_viral, detected_at) = set_viral_state(None, true, now);
        assert!(is_viral);
        assert_eq!(detected_at, Some(now));
    }

    #[test]
    fn flag_can_revert_but_timestamp_is_preserved() {
        let first_seen = Utc::now();
        let later = first_seen + chrono::Duration::hours(1);
        let (is_viral, detected_at) = set_viral_state(Some(first_seen), false, later);
        assert!(!is_viral);
        assert_eq!(detected_at, Some(first_seen));
    }

    #[test]
    fn never_viral_leaves_timestamp_null() {
        let (is_viral, detected_at) = set_viral_state(None, false, Utc::now());
        assert!(!is_viral);
        assert!(detected_at.is_none());
    }
}
