//! CRUD operations for the `users` table (Reddit authors), covering both
//! the cheap seen-from-a-post record and the full discovered-user profile
//! derived from `about.json`/`submitted.json`.

use super::DbPool;
use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// A Reddit user row. Authors encountered in post listings start as a
/// seen-only stub (karma/creation fields set, everything else default);
/// the full profile fields are populated once the user pipeline walks
/// `about.json`/`submitted.json` for that username.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct UserRecord {
    pub username: String,
    pub reddit_id: Option<String>,
    pub account_created_utc: Option<DateTime<Utc>>,
    pub account_age_days: Option<i64>,
    pub comment_karma: Option<i64>,
    pub link_karma: Option<i64>,
    pub total_karma: Option<i64>,
    pub is_employee: bool,
    pub is_mod: bool,
    pub is_gold: bool,
    pub is_verified: bool,
    pub has_verified_email: bool,
    pub is_suspended: bool,
    pub icon_img: Option<String>,
    pub subreddit_display_name: Option<String>,
    pub subreddit_title: Option<String>,
    pub subreddit_subscribers: Option<i64>,
    pub subreddit_over_18: bool,
    pub subreddit_banner_img: Option<String>,
    pub bio: Option<String>,
    pub bio_url: Option<String>,
    pub avg_post_score: f64,
    pub avg_post_comments: f64,
    pub total_posts_analyzed: i64,
    pub karma_per_day: f64,
    pub preferred_content_type: Option<String>,
    pub most_active_posting_hour: Option<i32>,
    pub most_active_posting_day: Option<String>,
    pub our_creator: bool,
    pub verification_checked_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub first_seen_at: Option<DateTime<Utc>>,
    pub discovery_checked_at: Option<DateTime<Utc>>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// A seen-only stub for an author encountered in a post listing, before
    /// the user pipeline has ever walked their profile.
    pub fn seen_stub(username: &str, now: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            reddit_id: None,
            account_created_utc: None,
            account_age_days: None,
            comment_karma: None,
            link_karma: None,
            total_karma: None,
            is_employee: false,
            is_mod: false,
            is_gold: false,
            is_verified: false,
            has_verified_email: false,
            is_suspended: false,
            icon_img: None,
            subreddit_display_name: None,
            subreddit_title: None,
            subreddit_subscribers: None,
            subreddit_over_18: false,
            subreddit_banner_img: None,
            bio: None,
            bio_url: None,
            avg_post_score: 0.0,
            avg_post_comments: 0.0,
            total_posts_analyzed: 0,
            karma_per_day: 0.0,
            preferred_content_type: None,
            most_active_posting_hour: None,
            most_active_posting_day: None,
            our_creator: false,
            verification_checked_at: None,
            last_seen_at: Some(now),
            first_seen_at: Some(now),
            discovery_checked_at: None,
            last_scraped_at: None,
        }
    }

    /// Apply the operator-field-preservation rule for users: `our_creator`
    /// from `cached` always wins, "preserving `our_creator`
    /// and operator fields". The bookkeeping timestamps
    /// (`first_seen_at`, `last_seen_at`, `verification_checked_at`,
    /// `discovery_checked_at`) are maintained by the seen/verification/
    /// discovery passes, not by the profile derivation, so they're carried
    /// over from `cached` rather than reset.
    pub fn merge_operator_fields(mut self, cached: Option<&UserRecord>) -> Self {
        if let Some(cached) = cached {
            self.our_creator = cached.our_creator;
            self.verification_checked_at = cached.verification_checked_at;
            self.discovery_checked_at = cached.discovery_checked_at;
            self.first_seen_at = cached.first_seen_at.or(self.first_seen_at);
            self.last_seen_at = cached.last_seen_at.or(self.last_seen_at);
        }
        self
    }
}

/// Fetch a user row if already known.
pub async fn get(pool: &DbPool, username: &str) -> Result<Option<UserRecord>, StorageError> {
    sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)
}

/// Upsert seen-from-a-post metadata without disturbing profile or
/// verification state; `first_seen_at` is fixed on insert only.
pub async fn upsert_seen(
    pool: &DbPool,
    username: &str,
    link_karma: Option<i64>,
    comment_karma: Option<i64>,
    account_created_utc: Option<DateTime<Utc>>,
) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO users (username, link_karma, comment_karma, account_created_utc,
            is_verified, last_seen_at, first_seen_at)
         VALUES ($1, $2, $3, $4, false, now(), now())
         ON CONFLICT (username) DO UPDATE SET
            link_karma = COALESCE(EXCLUDED.link_karma, users.link_karma),
            comment_karma = COALESCE(EXCLUDED.comment_karma, users.comment_karma),
            account_created_utc = COALESCE(EXCLUDED.account_created_utc, users.account_created_utc),
            last_seen_at = now()",
    )
    .bind(username)
    .bind(link_karma)
    .bind(comment_karma)
    .bind(account_created_utc)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Full upsert of a derived user profile (caller must have already applied
/// [`UserRecord::merge_operator_fields`] against the cached row).
pub async fn upsert_user(pool: &DbPool, record: &UserRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO users (
            username, reddit_id, account_created_utc, account_age_days, comment_karma,
            link_karma, total_karma, is_employee, is_mod, is_gold, is_verified,
            has_verified_email, is_suspended, icon_img, subreddit_display_name,
            subreddit_title, subreddit_subscribers, subreddit_over_18, subreddit_banner_img,
            bio, bio_url, avg_post_score, avg_post_comments, total_posts_analyzed,
            karma_per_day, preferred_content_type, most_active_posting_hour,
            most_active_posting_day, our_creator, verification_checked_at, last_seen_at,
            first_seen_at, discovery_checked_at, last_scraped_at
         ) VALUES (
            $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,
            $22,$23,$24,$25,$26,$27,$28,$29,$30,$31,$32,$33,$34
         )
         ON CONFLICT (username) DO UPDATE SET
            reddit_id = EXCLUDED.reddit_id,
            account_created_utc = EXCLUDED.account_created_utc,
            account_age_days = EXCLUDED.account_age_days,
            comment_karma = EXCLUDED.comment_karma,
            link_karma = EXCLUDED.link_karma,
            total_karma = EXCLUDED.total_karma,
            is_employee = EXCLUDED.is_employee,
            is_mod = EXCLUDED.is_mod,
            is_gold = EXCLUDED.is_gold,
            is_verified = EXCLUDED.is_verified,
            has_verified_email = EXCLUDED.has_verified_email,
            is_suspended = EXCLUDED.is_suspended,
            icon_img = EXCLUDED.icon_img,
            subreddit_display_name = EXCLUDED.subreddit_display_name,
            subreddit_title = EXCLUDED.subreddit_title,
            subreddit_subscribers = EXCLUDED.subreddit_subscribers,
            subreddit_over_18 = EXCLUDED.subreddit_over_18,
            subreddit_banner_img = EXCLUDED.subreddit_banner_img,
            bio = EXCLUDED.bio,
            bio_url = EXCLUDED.bio_url,
            avg_post_score = EXCLUDED.avg_post_score,
            avg_post_comments = EXCLUDED.avg_post_comments,
            total_posts_analyzed = EXCLUDED.total_posts_analyzed,
            karma_per_day = EXCLUDED.karma_per_day,
            preferred_content_type = EXCLUDED.preferred_content_type,
            most_active_posting_hour = EXCLUDED.most_active_posting_hour,
            most_active_posting_day = EXCLUDED.most_active_posting_day,
            our_creator = EXCLUDED.our_creator,
            verification_checked_at = EXCLUDED.verification_checked_at,
            last_seen_at = EXCLUDED.last_seen_at,
            first_seen_at = EXCLUDED.first_seen_at,
            discovery_checked_at = EXCLUDED.discovery_checked_at,
            last_scraped_at = EXCLUDED.last_scraped_at",
    )
    .bind(&record.username)
    .bind(&record.reddit_id)
    .bind(record.account_created_utc)
    .bind(record.account_age_days)
    .bind(record.comment_karma)
    .bind(record.link_karma)
    .bind(record.total_karma)
    .bind(record.is_employee)
    .bind(record.is_mod)
    .bind(record.is_gold)
    .bind(record.is_verified)
    .bind(record.has_verified_email)
    .bind(record.is_suspended)
    .bind(&record.icon_img)
    .bind(&record.subreddit_display_name)
    .bind(&record.subreddit_title)
    .bind(record.subreddit_subscribers)
    .bind(record.subreddit_over_18)
    .bind(&record.subreddit_banner_img)
    .bind(&record.bio)
    .bind(&record.bio_url)
    .bind(record.avg_post_score)
    .bind(record.avg_post_comments)
    .bind(record.total_posts_analyzed)
    .bind(record.karma_per_day)
    .bind(&record.preferred_content_type)
    .bind(record.most_active_posting_hour)
    .bind(&record.most_active_posting_day)
    .bind(record.our_creator)
    .bind(record.verification_checked_at)
    .bind(record.last_seen_at)
    .bind(record.first_seen_at)
    .bind(record.discovery_checked_at)
    .bind(record.last_scraped_at)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Usernames whose verification status has never been checked, ordered by
/// most-recently-seen first -- the candidate pool for step 9's budgeted
/// verification pass.
pub async fn list_unverified(pool: &DbPool, limit: i64) -> Result<Vec<UserRecord>, StorageError> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT * FROM users WHERE verification_checked_at IS NULL
         ORDER BY last_seen_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(StorageError::from)
}

/// Record the outcome of a verification check.
pub async fn set_verification(
    pool: &DbPool,
    username: &str,
    is_verified: bool,
) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE users SET is_verified = $2, verification_checked_at = now() WHERE username = $1",
    )
    .bind(username)
    .bind(is_verified)
    .execute(pool)
    .await
    .map_err(StorageError::from)?;
    Ok(())
}

/// Usernames whose submission history has never been walked by the user
/// pipeline, ordered most-recently-seen first -- the candidate pool for
/// step 9's budgeted discovery pass.
pub async fn list_undiscovered(pool: &DbPool, limit: i64) -> Result<Vec<UserRecord>, StorageError> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT * FROM users WHERE discovery_checked_at IS NULL
         ORDER BY last_seen_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(StorageError::from)
}

/// Record that a user's submission history has been walked for discovery,
/// whether or not it yielded any new subreddits.
pub async fn mark_discovery_checked(pool: &DbPool, username: &str) -> Result<(), StorageError> {
    sqlx::query("UPDATE users SET discovery_checked_at = now() WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
    Ok(())
}
