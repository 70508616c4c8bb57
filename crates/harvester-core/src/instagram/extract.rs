//! Caption text mining: hashtag and mention extraction, and paid-partnership
//! detection, applied to every Instagram post and reel caption during
//! ingest.

use once_cell::sync::Lazy;
use regex::Regex;

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Za-z0-9_.]+)").unwrap());

/// Phrases that reliably indicate a branded/paid partnership when present
/// anywhere in a caption, independent of the API's own (often absent)
/// sponsorship metadata.
const PARTNERSHIP_MARKERS: [&str; 6] = [
    "#ad",
    "#sponsored",
    "paid partnership",
    "#partner",
    "in partnership with",
    "#collab",
];

/// Extract unique hashtags from a caption, lowercased and without the `#`.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    HASHTAG_RE
        .captures_iter(caption)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_lowercase()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Extract unique `@mentions` from a caption, without the `@`.
pub fn extract_mentions(caption: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    MENTION_RE
        .captures_iter(caption)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .filter(|mention| seen.insert(mention.clone()))
        .collect()
}

/// Whether a caption shows one of the known paid-partnership markers.
pub fn is_paid_partnership(caption: &str) -> bool {
    let lower = caption.to_lowercase();
    PARTNERSHIP_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hashtags_deduplicated_and_lowercased() {
        let tags = extract_hashtags("Loving this #Sunset #sunset #beach vibe");
        assert_eq!(tags, vec!["sunset", "beach"]);
    }

    #[test]
    fn extracts_mentions() {
        let mentions = extract_mentions("shot by @photo.guy with @studio_x");
        assert_eq!(mentions, vec!["photo.guy", "studio_x"]);
    }

    #[test]
    fn detects_paid_partnership_markers() {
        assert!(is_paid_partnership("New drop! #ad #sponsored"));
        assert!(is_paid_partnership("This post is in partnership with Acme"));
        assert!(!is_paid_partnership("Just a regular caption about my day"));
    }
}
