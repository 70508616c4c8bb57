//! Pure derivation of subreddit engagement metrics from the weekly-top
//! post window, "Metric derivation". Kept free of I/O so
//! it can be exercised without a database.

use crate::storage::posts::PostRecord;
use chrono::{Datelike, Timelike};
use std::collections::HashMap;

/// Drop stickied posts from the top-10 weekly set before any derivation,
/// : "Filter stickied posts out of the top-10 weekly set;
/// let N be the surviving count."
pub fn non_stickied(posts: &[PostRecord]) -> Vec<&PostRecord> {
    posts.iter().filter(|p| !p.stickied).collect()
}

/// `sum(score)/N`, zero when the surviving set is empty.
pub fn avg_upvotes_per_post(posts: &[&PostRecord]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    posts.iter().map(|p| p.score as f64).sum::<f64>() / posts.len() as f64
}

/// `sum(num_comments)/sum(score)` when `sum(score) > 0`, else zero.
pub fn engagement(posts: &[&PostRecord]) -> f64 {
    let total_score: f64 = posts.iter().map(|p| p.score as f64).sum();
    if total_score <= 0.0 {
        return 0.0;
    }
    let total_comments: f64 = posts.iter().map(|p| p.num_comments as f64).sum();
    total_comments / total_score
}

/// `sqrt(engagement * avg_upvotes_per_post * 1000)` when both factors are
/// positive, else zero.
pub fn subreddit_score(engagement: f64, avg_upvotes_per_post: f64) -> f64 {
    if engagement > 0.0 && avg_upvotes_per_post > 0.0 {
        (engagement * avg_upvotes_per_post * 1000.0).sqrt()
    } else {
        0.0
    }
}

/// Mode of post creation weekday/hour in the surviving set, gated on
/// `engagement > 0.01` ; otherwise `(None, None)` ("N/A").
pub fn best_posting_day_hour(posts: &[&PostRecord], engagement: f64) -> (Option<String>, Option<String>) {
    if posts.is_empty() || engagement <= 0.01 {
        return (None, None);
    }

    let mut by_day: HashMap<u32, u32> = HashMap::new();
    let mut by_hour: HashMap<u32, u32> = HashMap::new();
    for post in posts {
        *by_day.entry(post.created_utc.weekday().num_days_from_monday()).or_insert(0) += 1;
        *by_hour.entry(post.created_utc.hour()).or_insert(0) += 1;
    }

    const DAY_NAMES: [&str; 7] = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ];

    // Ties break on the lower index for determinism; `max_by_key` returns
    // the last maximum, so iterate in ascending key order.
    let best_day = (0..7u32)
        .filter_map(|day| by_day.get(&day).map(|count| (day, *count)))
        .max_by_key(|(_, count)| *count)
        .map(|(day, _)| DAY_NAMES[day as usize].to_string());
    let best_hour = (0..24u32)
        .filter_map(|hour| by_hour.get(&hour).map(|count| (hour, *count)))
        .max_by_key(|(_, count)| *count)
        .map(|(hour, _)| hour.to_string());

    (best_day, best_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(score: i64, comments: i64, stickied: bool, created_utc: chrono::DateTime<Utc>) -> PostRecord {
        PostRecord {
            reddit_id: "abc".to_string(),
            subreddit: "test".to_string(),
            author: None,
            title: "t".to_string(),
            selftext: None,
            url: None,
            permalink: "/r/test/abc".to_string(),
            score,
            upvote_ratio: Some(0.9),
            num_comments: comments,
            created_utc,
            over_18: false,
            is_video: false,
            stickied,
            media_url: None,
            last_updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_window_yields_zero_metrics() {
        let empty: Vec<&PostRecord> = vec![];
        assert_eq!(avg_upvotes_per_post(&empty), 0.0);
        assert_eq!(engagement(&empty), 0.0);
        assert_eq!(subreddit_score(0.0, 0.0), 0.0);
        assert_eq!(best_posting_day_hour(&empty, 0.0), (None, None));
    }

    #[test]
    fn stickied_posts_are_excluded_before_derivation() {
        let now = Utc::now();
        let all = vec![post(1_000_000, 0, true, now), post(100, 10, false, now)];
        let owned: Vec<&PostRecord> = all.iter().collect();
        let surviving = non_stickied(&all);
        assert_eq!(surviving.len(), 1);
        assert_eq!(owned.len(), 2);
        assert_eq!(avg_upvotes_per_post(&surviving), 100.0);
    }

    #[test]
    fn avg_upvotes_per_post_averages_scores() {
        let now = Utc::now();
        let all = vec![post(100, 10, false, now), post(200, 20, false, now)];
        let posts: Vec<&PostRecord> = all.iter().collect();
        assert_eq!(avg_upvotes_per_post(&posts), 150.0);
    }

    #[test]
    fn engagement_is_comments_over_score_without_avg_multiplier() {
        let now = Utc::now();
        let all = vec![post(100, 10, false, now), post(100, 10, false, now)];
        let posts: Vec<&PostRecord> = all.iter().collect();
        // sum(comments)=20, sum(score)=200 -> 0.1, independent of N.
        assert_eq!(engagement(&posts), 0.1);
    }

    #[test]
    fn subreddit_score_matches_sqrt_formula() {
        let score = subreddit_score(0.1, 150.0);
        assert!((score - (0.1_f64 * 150.0 * 1000.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn subreddit_score_is_zero_when_either_factor_is_non_positive() {
        assert_eq!(subreddit_score(0.0, 150.0), 0.0);
        assert_eq!(subreddit_score(0.1, 0.0), 0.0);
    }

    #[test]
    fn best_posting_day_hour_picks_highest_frequency_bucket() {
        let monday_9am = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let monday_9am_2 = Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap();
        let tuesday_3pm = Utc.with_ymd_and_hms(2026, 1, 6, 15, 0, 0).unwrap();
        let all = vec![
            post(10, 5, false, monday_9am),
            post(10, 5, false, monday_9am_2),
            post(1_000_000, 1, false, tuesday_3pm),
        ];
        let posts: Vec<&PostRecord> = all.iter().collect();
        let (day, hour) = best_posting_day_hour(&posts, 1.0);
        assert_eq!(day.as_deref(), Some("Monday"));
        assert_eq!(hour.as_deref(), Some("9"));
    }

    #[test]
    fn best_posting_day_hour_is_na_below_engagement_threshold() {
        let now = Utc::now();
        let all = vec![post(100, 1, false, now)];
        let posts: Vec<&PostRecord> = all.iter().collect();
        assert_eq!(best_posting_day_hour(&posts, 0.01), (None, None));
        assert_eq!(best_posting_day_hour(&posts, 0.0), (None, None));
    }
}
