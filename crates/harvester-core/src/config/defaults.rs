//! Default values used when an environment variable is absent.

use std::time::Duration;

/// Default ~15-entry User-Agent pool, rotated per Reddit request.
pub fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Android 14; Mobile; rv:125.0) Gecko/125.0 Firefox/125.0",
        "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Mobile Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
        "Mozilla/5.0 (compatible; Konqueror/5.0; Linux) KHTML/5.0 (like Gecko)",
        "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36 Edg/124.0",
        "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Keyword substrings (lowercase) that classify a subreddit as Non-Related
/// when matched against `rules_text + description`. The full operational
/// list is configuration-driven ; this is the built-in
/// default set.
pub fn default_non_related_keywords() -> Vec<String> {
    [
        "hentai",
        "furry",
        "scat",
        "abdl",
        "vore",
        "feet only",
        "diaper",
        "cub content",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Keyword substrings (lowercase) that set `verification_required = true`.
pub fn default_verification_keywords() -> Vec<String> {
    ["verification", "verified", "verify"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub const DEFAULT_PROXY_DISABLE_THRESHOLD: u32 = 20;
pub const DEFAULT_PROXY_VALIDATE_CONCURRENCY: usize = 2;
pub const DEFAULT_PROXY_VALIDATE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PROXY_PERSIST_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_PROXY_PERSIST_EVERY_N: u32 = 10;

pub const DEFAULT_ACCOUNT_COOLDOWN: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_ACCOUNT_MAX_CONSECUTIVE_FAILURES: u32 = 5;
pub const DEFAULT_ACCOUNT_MIN_HEALTH_SCORE: u8 = 10;

pub const DEFAULT_REDDIT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REDDIT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REDDIT_REFRESH_AFTER: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_REDDIT_HOT_LIMIT: u32 = 30;
pub const DEFAULT_REDDIT_TOP_LIMIT: u32 = 10;
pub const DEFAULT_REDDIT_USER_SUBMITTED_LIMIT: u32 = 30;

pub const DEFAULT_INSTAGRAM_RAPIDAPI_HOST: &str = "instagram-looter2.p.rapidapi.com";
pub const DEFAULT_INSTAGRAM_REQUESTS_PER_SECOND: u32 = 55;
pub const DEFAULT_INSTAGRAM_CONCURRENCY: usize = 10;
pub const DEFAULT_INSTAGRAM_CYCLE_WAIT: Duration = Duration::from_secs(4 * 60 * 60);
pub const DEFAULT_INSTAGRAM_NEW_CREATOR_TARGET: u32 = 90;
pub const DEFAULT_INSTAGRAM_EXISTING_CREATOR_TARGET: u32 = 30;
pub const DEFAULT_INSTAGRAM_VIRAL_MIN_VIEWS: u64 = 50_000;
pub const DEFAULT_INSTAGRAM_VIRAL_MULTIPLIER: f64 = 5.0;
pub const DEFAULT_INSTAGRAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_INSTAGRAM_MAX_RETRIES: u32 = 3;

pub const DEFAULT_MEDIA_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MEDIA_IMAGE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MEDIA_VIDEO_TIMEOUT: Duration = Duration::from_secs(90);

pub const DEFAULT_SUPERVISOR_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_SUPERVISOR_DRAIN_DEADLINE: Duration = Duration::from_secs(30);
pub const DEFAULT_SUPERVISOR_STALE_HEARTBEAT_REDDIT: Duration = Duration::from_secs(300);
pub const DEFAULT_SUPERVISOR_STALE_HEARTBEAT_INSTAGRAM: Duration = Duration::from_secs(120);

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
