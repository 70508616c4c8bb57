//! The user pipeline's profile derivation: turns `about.json` and
//! `submitted.json` into a full [`UserRecord`], "User
//! pipeline" -- account age, karma totals and rate, content-type mix, and
//! posting-time mode. Kept free of I/O so it can be exercised without a
//! client or database.

use crate::storage::users::UserRecord;
use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static BIO_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

const DAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// A minimal record for a user whose `about.json` returned 403: "on 403 mark `is_suspended=true` and persist
/// minimal record".
pub fn suspended_record(username: &str) -> UserRecord {
    UserRecord {
        is_suspended: true,
        ..UserRecord::seen_stub(username, Utc::now())
    }
}

/// Derive the full profile from `about.json`'s `data` object and the
/// deduplicated list of submissions from `submitted.json`, "derive account_age_days, karma totals, computed
/// karma_per_day" plus "derive content-type mix ...,
/// most-active-hour/day ..., avg post score/comments".
pub fn derive_profile(username: &str, about: &serde_json::Value, posts: &[serde_json::Value], now: DateTime<Utc>) -> UserRecord {
    let data = &about["data"];
    let subreddit = &data["subreddit"];

    let created_utc = data["created_utc"]
        .as_f64()
        .and_then(|t| DateTime::from_timestamp(t as i64, 0));
    let account_age_days = created_utc.map(|created| (now - created).num_days().max(0));

    let link_karma = data["link_karma"].as_i64().unwrap_or(0);
    let comment_karma = data["comment_karma"].as_i64().unwrap_or(0);
    let total_karma = link_karma + comment_karma;
    let karma_per_day = round2(total_karma as f64 / account_age_days.unwrap_or(0).max(1) as f64);

    let bio = subreddit["public_description"].as_str().filter(|s| !s.is_empty()).map(|s| s.to_string());
    let bio_url = bio.as_deref().and_then(|b| BIO_URL_RE.find(b)).map(|m| m.as_str().to_string());

    let (content_type, avg_score, avg_comments, best_day, best_hour) = analyze_posts(posts);

    UserRecord {
        username: username.to_string(),
        reddit_id: data["id"].as_str().map(|s| s.to_string()),
        account_created_utc: created_utc,
        account_age_days,
        comment_karma: Some(comment_karma),
        link_karma: Some(link_karma),
        total_karma: Some(total_karma),
        is_employee: data["is_employee"].as_bool().unwrap_or(false),
        is_mod: data["is_mod"].as_bool().unwrap_or(false),
        is_gold: data["is_gold"].as_bool().unwrap_or(false),
        is_verified: data["verified"].as_bool().unwrap_or(false),
        has_verified_email: data["has_verified_email"].as_bool().unwrap_or(false),
        is_suspended: false,
        icon_img: data["icon_img"].as_str().map(|s| s.to_string()),
        subreddit_display_name: subreddit["display_name"].as_str().map(|s| s.to_string()),
        subreddit_title: subreddit["title"].as_str().map(|s| s.to_string()),
        subreddit_subscribers: subreddit["subscribers"].as_i64(),
        subreddit_over_18: subreddit["over_18"].as_bool().unwrap_or(false),
        subreddit_banner_img: subreddit["banner_img"].as_str().map(|s| s.to_string()),
        bio,
        bio_url,
        avg_post_score: avg_score,
        avg_post_comments: avg_comments,
        total_posts_analyzed: posts.len() as i64,
        karma_per_day,
        preferred_content_type: content_type,
        most_active_posting_hour: best_hour,
        most_active_posting_day: best_day,
        our_creator: false,
        verification_checked_at: None,
        last_seen_at: None,
        first_seen_at: None,
        discovery_checked_at: None,
        last_scraped_at: Some(now),
    }
}

#[allow(clippy::type_complexity)]
fn analyze_posts(posts: &[serde_json::Value]) -> (Option<String>, f64, f64, Option<String>, Option<i32>) {
    if posts.is_empty() {
        return (None, 0.0, 0.0, None, None);
    }

    let mut content_types: HashMap<&'static str, u32> = HashMap::new();
    let mut by_day: HashMap<u32, u32> = HashMap::new();
    let mut by_hour: HashMap<u32, u32> = HashMap::new();
    let mut total_score = 0i64;
    let mut total_comments = 0i64;

    for post in posts {
        *content_types.entry(classify_content_type(post)).or_insert(0) += 1;

        if let Some(created) = post["created_utc"].as_f64().and_then(|t| DateTime::from_timestamp(t as i64, 0)) {
            *by_day.entry(created.weekday().num_days_from_monday()).or_insert(0) += 1;
            *by_hour.entry(created.hour()).or_insert(0) += 1;
        }

        total_score += post["score"].as_i64().unwrap_or(0);
        total_comments += post["num_comments"].as_i64().unwrap_or(0);
    }

    let preferred_content_type = content_types
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(kind, _)| kind.to_string());

    let best_day = (0..7u32)
        .filter_map(|day| by_day.get(&day).map(|count| (day, *count)))
        .max_by_key(|(_, count)| *count)
        .map(|(day, _)| DAY_NAMES[day as usize].to_string());
    let best_hour = (0..24u32)
        .filter_map(|hour| by_hour.get(&hour).map(|count| (hour, *count)))
        .max_by_key(|(_, count)| *count)
        .map(|(hour, _)| hour as i32);

    let n = posts.len() as f64;
    (
        preferred_content_type,
        round2(total_score as f64 / n),
        round2(total_comments as f64 / n),
        best_day,
        best_hour,
    )
}

/// Classify one submission's content type, "Content type analysis".
fn classify_content_type(post: &serde_json::Value) -> &'static str {
    let domain = post["domain"].as_str().unwrap_or_default();
    let url = post["url"].as_str().unwrap_or_default();
    let is_video = post["is_video"].as_bool().unwrap_or(false);
    let is_self = post["is_self"].as_bool().unwrap_or(false);

    const VIDEO_DOMAINS: [&str; 3] = ["v.redd.it", "youtube.com", "youtu.be"];
    const IMAGE_DOMAINS: [&str; 2] = ["i.redd.it", "imgur.com"];
    const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".gif", ".jpeg"];

    if is_video || VIDEO_DOMAINS.contains(&domain) {
        "video"
    } else if IMAGE_DOMAINS.contains(&domain) || IMAGE_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        "image"
    } else if is_self {
        "text"
    } else {
        "link"
    }
}

fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Extract the flat list of submission bodies from a `submitted.json`
/// listing, newest API shape: `data.children[].data`.
pub fn extract_submissions(listing: &serde_json::Value) -> Vec<serde_json::Value> {
    listing["data"]["children"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|child| child["data"].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn about_json(created_utc: i64) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "id": "t2_abc123",
                "created_utc": created_utc,
                "link_karma": 500,
                "comment_karma": 1500,
                "is_employee": false,
                "is_mod": true,
                "is_gold": false,
                "verified": true,
                "has_verified_email": true,
                "icon_img": "https://example.com/icon.png",
                "subreddit": {
                    "display_name": "u_creatorname",
                    "title": "creatorname",
                    "subscribers": 42,
                    "over_18": false,
                    "public_description": "check my site https://example.com/bio",
                    "banner_img": "https://example.com/banner.png",
                }
            }
        })
    }

    fn post(created_utc: i64, score: i64, comments: i64, domain: &str, url: &str, is_video: bool, is_self: bool) -> serde_json::Value {
        serde_json::json!({
            "created_utc": created_utc,
            "score": score,
            "num_comments": comments,
            "domain": domain,
            "url": url,
            "is_video": is_video,
            "is_self": is_self,
        })
    }

    #[test]
    fn classifies_video_image_text_and_link_posts() {
        assert_eq!(classify_content_type(&post(0, 0, 0, "v.redd.it", "", true, false)), "video");
        assert_eq!(classify_content_type(&post(0, 0, 0, "i.redd.it", "", false, false)), "image");
        assert_eq!(
            classify_content_type(&post(0, 0, 0, "example.com", "https://example.com/a.jpeg", false, false)),
            "image"
        );
        assert_eq!(classify_content_type(&post(0, 0, 0, "self.rust", "", false, true)), "text");
        assert_eq!(classify_content_type(&post(0, 0, 0, "example.com", "https://example.com", false, false)), "link");
    }

    #[test]
    fn derives_account_age_and_karma_totals() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let record = derive_profile("creator", &about_json(created.timestamp()), &[], now);

        assert_eq!(record.link_karma, Some(500));
        assert_eq!(record.comment_karma, Some(1500));
        assert_eq!(record.total_karma, Some(2000));
        assert!(record.account_age_days.unwrap() > 2000);
        assert!(record.karma_per_day > 0.0);
        assert_eq!(record.bio_url.as_deref(), Some("https://example.com/bio"));
        assert!(record.is_mod);
        assert!(!record.our_creator);
    }

    #[test]
    fn derives_content_mix_and_posting_mode_from_submissions() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let monday_9am = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let monday_9am_2 = Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap();
        let tuesday_3pm = Utc.with_ymd_and_hms(2026, 1, 6, 15, 0, 0).unwrap();

        let posts = vec![
            post(monday_9am.timestamp(), 100, 10, "i.redd.it", "", false, false),
            post(monday_9am_2.timestamp(), 200, 20, "i.redd.it", "", false, false),
            post(tuesday_3pm.timestamp(), 10, 1, "v.redd.it", "", true, false),
        ];

        let record = derive_profile("creator", &about_json(now.timestamp()), &posts, now);
        assert_eq!(record.preferred_content_type.as_deref(), Some("image"));
        assert_eq!(record.most_active_posting_day.as_deref(), Some("Monday"));
        assert_eq!(record.most_active_posting_hour, Some(9));
        assert_eq!(record.total_posts_analyzed, 3);
        assert!((record.avg_post_score - (310.0 / 3.0 * 100.0).round() / 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_submissions_yield_none_and_zero() {
        let now = Utc::now();
        let record = derive_profile("creator", &about_json(now.timestamp()), &[], now);
        assert_eq!(record.preferred_content_type, None);
        assert_eq!(record.most_active_posting_day, None);
        assert_eq!(record.most_active_posting_hour, None);
        assert_eq!(record.avg_post_score, 0.0);
        assert_eq!(record.total_posts_analyzed, 0);
    }

    #[test]
    fn suspended_record_sets_flag_and_leaves_profile_empty() {
        let record = suspended_record("bannedguy");
        assert!(record.is_suspended);
        assert_eq!(record.total_karma, None);
        assert!(!record.our_creator);
    }

    #[test]
    fn extracts_submission_bodies_from_listing() {
        let listing = serde_json::json!({
            "data": {"children": [{"data": {"id": "abc"}}, {"data": {"id": "def"}}]}
        });
        let posts = extract_submissions(&listing);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["id"], "abc");
    }
}
