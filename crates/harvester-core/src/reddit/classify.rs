//! Auto-classification of newly discovered subreddits by keyword matching
//! against the concatenation of rules-text and description -- the same
//! heuristic the operator dashboard uses to pre-sort the review queue
//! before a human confirms it.
//!
//! The two keyword sets are independent outcomes, not alternatives:
//! `review` is only ever set to "Non Related" (and only when unreviewed),
//! while `verification_required` is a standalone flag set regardless of
//! `review`.

fn matches_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| haystack.contains(&kw.to_lowercase()))
}

/// Whether the combined text matches a configured non-related keyword.
/// Only meaningful to apply when the cached `review` is null.
pub fn is_non_related(text: &str, non_related_keywords: &[String]) -> bool {
    matches_any(&text.to_lowercase(), non_related_keywords)
}

/// Whether the combined text matches a configured verification keyword.
/// Applies unconditionally, independent of `review`.
pub fn requires_verification(text: &str, verification_keywords: &[String]) -> bool {
    matches_any(&text.to_lowercase(), verification_keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn verification_applies_independently_of_non_related() {
        let non_related = keywords(&["gaming"]);
        let verification = keywords(&["verified"]);
        let text = "A gaming community, verified members only";
        assert!(is_non_related(text, &non_related));
        assert!(requires_verification(text, &verification));
    }

    #[test]
    fn verification_keyword_matches_when_no_non_related_hit() {
        let non_related = keywords(&["gaming"]);
        let verification = keywords(&["verified"]);
        let text = "Must be verified to post";
        assert!(!is_non_related(text, &non_related));
        assert!(requires_verification(text, &verification));
    }

    #[test]
    fn no_match_is_unclassified() {
        let non_related = keywords(&["gaming"]);
        let verification = keywords(&["verified"]);
        let text = "A general discussion community";
        assert!(!is_non_related(text, &non_related));
        assert!(!requires_verification(text, &verification));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let non_related = keywords(&["GAMING"]);
        assert!(is_non_related("a Gaming forum", &non_related));
    }
}
