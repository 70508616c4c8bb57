//! Pure derivation of creator rollup statistics from the full stored reel
//! set ("Recompute creator rollups"). Kept free of I/O, mirroring
//! [`crate::reddit::metrics`]; the caller re-queries every stored reel for a
//! creator rather than just the page just fetched, matching how the
//! reference scraper recomputes `avg_views_per_reel_cached` from the whole
//! `instagram_reels` table on each cycle.
use crate::storage::reels::ReelRecord;

/// `(total_reels, total_views, avg_views_per_reel, avg_engagement)`. All
/// zero when `reels` is empty. `avg_engagement` is the mean, over reels with
/// a nonzero view count, of `(likes + comments) / views`.
pub fn compute_rollups(reels: &[ReelRecord]) -> (i64, i64, f64, f64) {
    let total_reels = reels.len() as i64;
    if total_reels == 0 {
        return (0, 0, 0.0, 0.0);
    }

    let total_views: i64 = reels.iter().map(|r| r.play_count.unwrap_or(0)).sum();
    let avg_views_per_reel = total_views as f64 / total_reels as f64;

    let engagement_samples: Vec<f64> = reels
        .iter()
        .filter_map(|r| {
            let views = r.play_count.unwrap_or(0);
            if views <= 0 {
                return None;
            }
            let likes = r.like_count.unwrap_or(0) as f64;
            let comments = r.comment_count.unwrap_or(0) as f64;
            Some((likes + comments) / views as f64)
        })
        .collect();
    let avg_engagement = if engagement_samples.is_empty() {
        0.0
    } else {
        engagement_samples.iter().sum::<f64>() / engagement_samples.len() as f64
    };

    (total_reels, total_views, avg_views_per_reel, avg_engagement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reel(play_count: Option<i64>, like_count: Option<i64>, comment_count: Option<i64>) -> ReelRecord {
        ReelRecord {
            media_pk: "abc".to_string(),
            creator_username: "creator1".to_string(),
            caption: None,
            play_count,
            like_count,
            comment_count,
            video_duration_seconds: None,
            taken_at: Utc::now(),
            is_viral: false,
            viral_detected_at: None,
            hashtags: None,
            mentions: None,
            paid_partnership: false,
            media_url: None,
            last_updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_set_yields_all_zeros() {
        assert_eq!(compute_rollups(&[]), (0, 0, 0.0, 0.0));
    }

    #[test]
    fn averages_views_and_engagement_across_reels() {
        let reels = vec![
            reel(Some(100_000), Some(9_000), Some(1_000)),
            reel(Some(50_000), Some(4_000), Some(500)),
        ];
        let (total_reels, total_views, avg_views, avg_engagement) = compute_rollups(&reels);
        assert_eq!(total_reels, 2);
        assert_eq!(total_views, 150_000);
        assert_eq!(avg_views, 75_000.0);
        // (10000/100000 + 4500/50000) / 2 = (0.10 + 0.09) / 2
        assert!((avg_engagement - 0.095).abs() < 1e-9);
    }

    #[test]
    fn zero_view_reels_are_excluded_from_engagement_but_counted_in_total_reels() {
        let reels = vec![reel(None, Some(10), Some(1)), reel(Some(1_000), Some(50), Some(5))];
        let (total_reels, total_views, avg_views, avg_engagement) = compute_rollups(&reels);
        assert_eq!(total_reels, 2);
        assert_eq!(total_views, 1_000);
        assert_eq!(avg_views, 500.0);
        assert!((avg_engagement - 0.055).abs() < 1e-9);
    }
}
