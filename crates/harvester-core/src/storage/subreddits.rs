//! CRUD operations for the `subreddits` table.

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;

/// A subreddit row, mirroring the `subreddits` table.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SubredditRecord {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub public_description: Option<String>,
    pub subscribers: Option<i64>,
    pub over18: bool,
    pub created_utc: Option<DateTime<Utc>>,
    pub allow_images: bool,
    pub allow_videos: bool,
    pub allow_polls: bool,
    pub spoilers_enabled: bool,
    pub verification_required: bool,
    pub rules_data: Option<Json>,
    pub engagement: f64,
    pub subreddit_score: f64,
    pub avg_upvotes_per_post: f64,
    pub best_posting_day: Option<String>,
    pub best_posting_hour: Option<String>,
    pub icon_img: Option<String>,
    pub banner_img: Option<String>,
    pub community_icon: Option<String>,
    pub header_img: Option<String>,
    pub primary_color: Option<String>,
    pub key_color: Option<String>,
    pub subreddit_type: Option<String>,
    pub url: Option<String>,
    pub wiki_enabled: bool,
    pub review: Option<String>,
    pub primary_category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl SubredditRecord {
    /// Apply the operator-field-preservation rule:
    /// `review`, `primary_category`, `tags`, `over18` from `cached` always
    /// win over freshly derived values, except `review` may be set by
    /// auto-classification when `cached.review` is null.
    pub fn merge_operator_fields(mut self, cached: Option<&SubredditRecord>) -> Self {
        if let Some(cached) = cached {
            self.primary_category = cached.primary_category.clone();
            self.tags = cached.tags.clone();
            self.over18 = cached.over18;
            if cached.review.is_some() {
                self.review = cached.review.clone();
            }
        }
        self
    }
}

/// Fetch the current row for `name`, if any, for use in operator-field merge.
pub async fn get(pool: &DbPool, name: &str) -> Result<Option<SubredditRecord>, StorageError> {
    sqlx::query_as::<_, SubredditRecord>("SELECT * FROM subreddits WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)
}

/// List subreddits whose `last_scraped_at` is older than `refresh_before`
/// (or null), ordered oldest-first -- never-scraped rows first, then the
/// stalest-scraped ones. Rows scraped more recently than `refresh_before`
/// are not yet due and are excluded.
pub async fn list_due_for_refresh(
    pool: &DbPool,
    refresh_before: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<SubredditRecord>, StorageError> {
    sqlx::query_as::<_, SubredditRecord>(
        "SELECT * FROM subreddits \
         WHERE (review IN ('Ok', 'OK') OR review IS NULL) \
           AND (last_scraped_at IS NULL OR last_scraped_at < $1) \
         ORDER BY last_scraped_at IS NOT NULL, last_scraped_at ASC \
         LIMIT $2",
    )
    .bind(refresh_before)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(StorageError::from)
}

/// Enqueue a newly discovered subreddit name (step 9's discovery set) as a
/// name-only row with `review`/`last_scraped_at` both null, so it surfaces
/// through [`list_due_for_refresh`]'s existing null-first ordering without a
/// separate queue table. A no-op if the name is already known, classified
/// or not -- discovery never overwrites an existing row.
pub async fn upsert_stub(pool: &DbPool, name: &str) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO subreddits (name, over18, allow_images, allow_videos, allow_polls,
            spoilers_enabled, verification_required, engagement, subreddit_score,
            avg_upvotes_per_post, wiki_enabled)
         VALUES ($1, false, true, true, false, false, false, 0.0, 0.0, 0.0, false)
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Upsert on `name`, preserving operator fields per
/// [`SubredditRecord::merge_operator_fields`] (caller must have already
/// applied the merge against the cached row).
pub async fn upsert(pool: &DbPool, record: &SubredditRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO subreddits (
            name, title, description, public_description, subscribers, over18,
            created_utc, allow_images, allow_videos, allow_polls, spoilers_enabled,
            verification_required, rules_data, engagement, subreddit_score,
            avg_upvotes_per_post, best_posting_day, best_posting_hour, icon_img,
            banner_img, community_icon, header_img, primary_color, key_color,
            subreddit_type, url, wiki_enabled, review, primary_category, tags,
            last_scraped_at
         ) VALUES (
            $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,
            $20,$21,$22,$23,$24,$25,$26,$27,$28,$29,$30,$31
         )
         ON CONFLICT (name) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            public_description = EXCLUDED.public_description,
            subscribers = EXCLUDED.subscribers,
            over18 = EXCLUDED.over18,
            created_utc = EXCLUDED.created_utc,
            allow_images = EXCLUDED.allow_images,
            allow_videos = EXCLUDED.allow_videos,
            allow_polls = EXCLUDED.allow_polls,
            spoilers_enabled = EXCLUDED.spoilers_enabled,
            verification_required = EXCLUDED.verification_required,
            rules_data = EXCLUDED.rules_data,
            engagement = EXCLUDED.engagement,
            subreddit_score = EXCLUDED.subreddit_score,
            avg_upvotes_per_post = EXCLUDED.avg_upvotes_per_post,
            best_posting_day = EXCLUDED.best_posting_day,
            best_posting_hour = EXCLUDED.best_posting_hour,
            icon_img = EXCLUDED.icon_img,
            banner_img = EXCLUDED.banner_img,
            community_icon = EXCLUDED.community_icon,
            header_img = EXCLUDED.header_img,
            primary_color = EXCLUDED.primary_color,
            key_color = EXCLUDED.key_color,
            subreddit_type = EXCLUDED.subreddit_type,
            url = EXCLUDED.url,
            wiki_enabled = EXCLUDED.wiki_enabled,
            review = EXCLUDED.review,
            primary_category = EXCLUDED.primary_category,
            tags = EXCLUDED.tags,
            last_scraped_at = EXCLUDED.last_scraped_at",
    )
    .bind(&record.name)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.public_description)
    .bind(record.subscribers)
    .bind(record.over18)
    .bind(record.created_utc)
    .bind(record.allow_images)
    .bind(record.allow_videos)
    .bind(record.allow_polls)
    .bind(record.spoilers_enabled)
    .bind(record.verification_required)
    .bind(&record.rules_data)
    .bind(record.engagement)
    .bind(record.subreddit_score)
    .bind(record.avg_upvotes_per_post)
    .bind(&record.best_posting_day)
    .bind(&record.best_posting_hour)
    .bind(&record.icon_img)
    .bind(&record.banner_img)
    .bind(&record.community_icon)
    .bind(&record.header_img)
    .bind(&record.primary_color)
    .bind(&record.key_color)
    .bind(&record.subreddit_type)
    .bind(&record.url)
    .bind(record.wiki_enabled)
    .bind(&record.review)
    .bind(&record.primary_category)
    .bind(&record.tags)
    .bind(record.last_scraped_at)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_record(name: &str) -> SubredditRecord {
        SubredditRecord {
            name: name.to_string(),
            title: None,
            description: None,
            public_description: None,
            subscribers: None,
            over18: false,
            created_utc: None,
            allow_images: true,
            allow_videos: true,
            allow_polls: false,
            spoilers_enabled: false,
            verification_required: false,
            rules_data: None,
            engagement: 0.0,
            subreddit_score: 0.0,
            avg_upvotes_per_post: 0.0,
            best_posting_day: None,
            best_posting_hour: None,
            icon_img: None,
            banner_img: None,
            community_icon: None,
            header_img: None,
            primary_color: None,
            key_color: None,
            subreddit_type: None,
            url: None,
            wiki_enabled: false,
            review: None,
            primary_category: None,
            tags: None,
            last_scraped_at: None,
        }
    }

    #[test]
    fn merge_preserves_operator_fields_when_review_set() {
        let mut cached = base_record("pics");
        cached.review = Some("Ok".to_string());
        cached.primary_category = Some("photography".to_string());
        cached.tags = Some(vec!["sfw".to_string()]);
        cached.over18 = true;

        let mut fresh = base_record("pics");
        fresh.review = Some("Non Related".to_string());
        fresh.primary_category = None;
        fresh.tags = None;
        fresh.over18 = false;

        let merged = fresh.merge_operator_fields(Some(&cached));
        assert_eq!(merged.review.as_deref(), Some("Ok"));
        assert_eq!(merged.primary_category.as_deref(), Some("photography"));
        assert_eq!(merged.tags, Some(vec!["sfw".to_string()]));
        assert!(merged.over18);
    }

    #[test]
    fn merge_allows_auto_classification_when_review_null() {
        let cached = base_record("hentaiclub");
        let mut fresh = base_record("hentaiclub");
        fresh.review = Some("Non Related".to_string());

        let merged = fresh.merge_operator_fields(Some(&cached));
        assert_eq!(merged.review.as_deref(), Some("Non Related"));
    }

    #[test]
    fn merge_is_noop_without_cached_row() {
        let mut fresh = base_record("new_sub");
        fresh.review = Some("Non Related".to_string());
        let merged = fresh.clone().merge_operator_fields(None);
        assert_eq!(merged.review, fresh.review);
    }
}
