//! Deterministic analytics over a post collection.
//!
//! Every average uses integer floor division and every ranked table has an
//! explicit tie rule (first occurrence in input order wins), so the same
//! posts always produce byte-identical output.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use gramsight_common::{MediaType, Post};

const BEST_POST_PREVIEW_CHARS: usize = 140;
const TOP_BY_FREQUENCY: usize = 25;
const TOP_BY_AVG_LIKES: usize = 10;

// --- Result payloads ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestPost {
    pub post_id: String,
    pub url: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub media_type: MediaType,
    pub caption_preview: String,
}

/// Post count and floor-averaged engagement for one bucket (a media type
/// or a month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    pub post_count: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_likes: u64,
    pub median_likes: u64,
    pub avg_comments: u64,
    pub best_post: BestPost,
    pub media_breakdown: BTreeMap<String, BucketStats>,
    /// Ascending month-key order.
    pub monthly_trend: BTreeMap<String, BucketStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagRow {
    /// Rendered with its sigil, e.g. `#run`.
    pub hashtag: String,
    pub frequency: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagAnalysis {
    pub total_unique_hashtags: u64,
    pub top_by_frequency: Vec<HashtagRow>,
    pub top_by_avg_likes: Vec<HashtagRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub posts: u64,
    pub total_likes: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
    pub media_mix: BTreeMap<String, u64>,
}

// --- Aggregates ---

/// Totals, floor averages, median likes, best post, and per-media/per-month
/// breakdowns. Returns `None` for an empty collection.
pub fn engagement_summary(posts: &[Post]) -> Option<EngagementSummary> {
    if posts.is_empty() {
        return None;
    }

    let n = posts.len() as u64;
    let total_likes: u64 = posts.iter().map(|p| p.like_count).sum();
    let total_comments: u64 = posts.iter().map(|p| p.comment_count).sum();

    let mut sorted_likes: Vec<u64> = posts.iter().map(|p| p.like_count).collect();
    sorted_likes.sort_unstable();
    let median_likes = median(&sorted_likes);

    // First occurrence wins on ties.
    let best = posts
        .iter()
        .reduce(|best, p| if p.like_count > best.like_count { p } else { best })
        .expect("non-empty");

    let mut media: BTreeMap<String, (u64, u64, u64)> = BTreeMap::new();
    let mut monthly: BTreeMap<String, (u64, u64, u64)> = BTreeMap::new();
    for p in posts {
        let m = media.entry(p.media_type.as_str().to_string()).or_default();
        m.0 += 1;
        m.1 += p.like_count;
        m.2 += p.comment_count;
        let t = monthly.entry(p.month.clone()).or_default();
        t.0 += 1;
        t.1 += p.like_count;
        t.2 += p.comment_count;
    }

    let bucketize = |(count, likes, comments): (u64, u64, u64)| BucketStats {
        post_count: count,
        avg_likes: likes / count,
        avg_comments: comments / count,
    };

    Some(EngagementSummary {
        total_posts: n,
        total_likes,
        total_comments,
        avg_likes: total_likes / n,
        median_likes,
        avg_comments: total_comments / n,
        best_post: BestPost {
            post_id: best.post_id.clone(),
            url: best.url.clone(),
            like_count: best.like_count,
            comment_count: best.comment_count,
            media_type: best.media_type,
            caption_preview: best.caption_preview(BEST_POST_PREVIEW_CHARS),
        },
        media_breakdown: media.into_iter().map(|(k, v)| (k, bucketize(v))).collect(),
        monthly_trend: monthly.into_iter().map(|(k, v)| (k, bucketize(v))).collect(),
    })
}

/// Middle element for odd counts, floor-average of the middle two for even.
/// Input must be sorted ascending and non-empty.
fn median(sorted: &[u64]) -> u64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2
    }
}

/// Per-hashtag frequency and engagement, in two ranked views. Ties keep
/// first-seen order: the accumulator map preserves the order hashtags first
/// appear across the input, and both sorts are stable.
pub fn hashtag_analysis(posts: &[Post]) -> HashtagAnalysis {
    let mut stats: IndexMap<String, (u64, u64, u64)> = IndexMap::new();
    for p in posts {
        for tag in &p.hashtags {
            let entry = stats.entry(tag.clone()).or_default();
            entry.0 += 1;
            entry.1 += p.like_count;
            entry.2 += p.comment_count;
        }
    }

    let rows: Vec<HashtagRow> = stats
        .into_iter()
        .map(|(tag, (count, likes, comments))| HashtagRow {
            hashtag: format!("#{tag}"),
            frequency: count,
            avg_likes: likes / count,
            avg_comments: comments / count,
        })
        .collect();

    let mut by_frequency = rows.clone();
    by_frequency.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    by_frequency.truncate(TOP_BY_FREQUENCY);

    let mut by_avg_likes = rows.clone();
    by_avg_likes.sort_by(|a, b| b.avg_likes.cmp(&a.avg_likes));
    by_avg_likes.truncate(TOP_BY_AVG_LIKES);

    HashtagAnalysis {
        total_unique_hashtags: rows.len() as u64,
        top_by_frequency: by_frequency,
        top_by_avg_likes: by_avg_likes,
    }
}

/// Per-month post count, likes, floor averages, and media-type mix, in
/// ascending month order.
pub fn monthly_breakdown(posts: &[Post]) -> BTreeMap<String, MonthlyStats> {
    let mut monthly: BTreeMap<String, (u64, u64, u64, BTreeMap<String, u64>)> = BTreeMap::new();
    for p in posts {
        let entry = monthly.entry(p.month.clone()).or_default();
        entry.0 += 1;
        entry.1 += p.like_count;
        entry.2 += p.comment_count;
        *entry.3.entry(p.media_type.as_str().to_string()).or_default() += 1;
    }

    monthly
        .into_iter()
        .map(|(month, (count, likes, comments, media_mix))| {
            (
                month,
                MonthlyStats {
                    posts: count,
                    total_likes: likes,
                    avg_likes: likes / count,
                    avg_comments: comments / count,
                    media_mix,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: &str, likes: u64, comments: u64, month: u32, media: MediaType) -> Post {
        let ts = Utc.with_ymd_and_hms(2026, month, 5, 12, 0, 0).unwrap();
        Post {
            post_id: id.into(),
            url: format!("https://www.instagram.com/p/{id}/"),
            caption: Some(format!("caption {id}")),
            hashtags: vec![],
            mentions: vec![],
            keywords: vec![],
            themes: vec![],
            theme_scores: Default::default(),
            like_count: likes,
            comment_count: comments,
            media_type: media,
            timestamp: ts,
            month: format!("2026-{month:02}"),
        }
    }

    fn with_tags(mut p: Post, tags: &[&str]) -> Post {
        p.hashtags = tags.iter().map(|s| s.to_string()).collect();
        p
    }

    #[test]
    fn empty_collection_yields_no_summary() {
        assert!(engagement_summary(&[]).is_none());
    }

    #[test]
    fn totals_and_floor_averages() {
        let posts = vec![
            post("A", 10, 3, 5, MediaType::Image),
            post("B", 21, 4, 5, MediaType::Video),
        ];
        let s = engagement_summary(&posts).unwrap();
        assert_eq!(s.total_posts, 2);
        assert_eq!(s.total_likes, 31);
        assert_eq!(s.avg_likes, 15); // 31 / 2 floored
        assert_eq!(s.avg_comments, 3); // 7 / 2 floored

        // Floor-division contract: avg*n <= total < (avg+1)*n
        assert!(s.avg_likes * s.total_posts <= s.total_likes);
        assert!(s.total_likes < (s.avg_likes + 1) * s.total_posts);
    }

    #[test]
    fn median_odd_is_middle_element() {
        let posts = vec![
            post("A", 10, 0, 5, MediaType::Image),
            post("B", 30, 0, 5, MediaType::Image),
            post("C", 20, 0, 5, MediaType::Image),
        ];
        assert_eq!(engagement_summary(&posts).unwrap().median_likes, 20);
    }

    #[test]
    fn median_even_is_floor_average_of_middle_two() {
        let posts = vec![
            post("A", 10, 0, 5, MediaType::Image),
            post("B", 20, 0, 5, MediaType::Image),
            post("C", 30, 0, 5, MediaType::Image),
            post("D", 40, 0, 5, MediaType::Image),
        ];
        assert_eq!(engagement_summary(&posts).unwrap().median_likes, 25);
    }

    #[test]
    fn best_post_tie_keeps_first_occurrence() {
        let posts = vec![
            post("FIRST", 50, 0, 5, MediaType::Image),
            post("SECOND", 50, 0, 5, MediaType::Image),
        ];
        let s = engagement_summary(&posts).unwrap();
        assert_eq!(s.best_post.post_id, "FIRST");
    }

    #[test]
    fn monthly_trend_is_ascending() {
        let posts = vec![
            post("A", 1, 0, 6, MediaType::Image),
            post("B", 1, 0, 4, MediaType::Image),
            post("C", 1, 0, 5, MediaType::Image),
        ];
        let s = engagement_summary(&posts).unwrap();
        let months: Vec<&String> = s.monthly_trend.keys().collect();
        assert_eq!(months, vec!["2026-04", "2026-05", "2026-06"]);
    }

    #[test]
    fn media_breakdown_counts_per_type() {
        let posts = vec![
            post("A", 10, 2, 5, MediaType::Image),
            post("B", 20, 4, 5, MediaType::Image),
            post("C", 5, 1, 5, MediaType::Video),
        ];
        let s = engagement_summary(&posts).unwrap();
        assert_eq!(
            s.media_breakdown["image"],
            BucketStats {
                post_count: 2,
                avg_likes: 15,
                avg_comments: 3
            }
        );
        assert_eq!(s.media_breakdown["video"].post_count, 1);
    }

    #[test]
    fn hashtag_frequencies_sum_to_total_tag_references() {
        let posts = vec![
            with_tags(post("A", 100, 0, 5, MediaType::Image), &["run"]),
            with_tags(post("B", 50, 0, 5, MediaType::Image), &["run", "gym"]),
            with_tags(post("C", 10, 0, 5, MediaType::Image), &["gym"]),
        ];
        let analysis = hashtag_analysis(&posts);

        let total_refs: u64 = analysis.top_by_frequency.iter().map(|r| r.frequency).sum();
        let expected: usize = posts.iter().map(|p| p.hashtags.len()).sum();
        assert_eq!(total_refs, expected as u64);
    }

    #[test]
    fn frequency_ranking_puts_common_tags_first_and_preserves_first_seen_order() {
        let posts = vec![
            with_tags(post("A", 100, 0, 5, MediaType::Image), &["run"]),
            with_tags(post("B", 50, 0, 5, MediaType::Image), &["run", "gym"]),
            with_tags(post("C", 10, 0, 5, MediaType::Image), &["gym", "solo"]),
        ];
        let analysis = hashtag_analysis(&posts);
        let ranked: Vec<&str> = analysis
            .top_by_frequency
            .iter()
            .map(|r| r.hashtag.as_str())
            .collect();

        // run and gym tie at 2 — run was seen first; solo (1) trails.
        assert_eq!(ranked, vec!["#run", "#gym", "#solo"]);
    }

    #[test]
    fn avg_likes_ranking_is_descending() {
        let posts = vec![
            with_tags(post("A", 10, 0, 5, MediaType::Image), &["low"]),
            with_tags(post("B", 90, 0, 5, MediaType::Image), &["high"]),
        ];
        let analysis = hashtag_analysis(&posts);
        assert_eq!(analysis.top_by_avg_likes[0].hashtag, "#high");
        assert_eq!(analysis.top_by_avg_likes[0].avg_likes, 90);
    }

    #[test]
    fn hashtag_avg_is_floored_over_carrying_posts() {
        let posts = vec![
            with_tags(post("A", 10, 1, 5, MediaType::Image), &["run"]),
            with_tags(post("B", 15, 2, 5, MediaType::Image), &["run"]),
        ];
        let analysis = hashtag_analysis(&posts);
        let run = &analysis.top_by_frequency[0];
        assert_eq!(run.frequency, 2);
        assert_eq!(run.avg_likes, 12); // 25 / 2 floored
        assert_eq!(run.avg_comments, 1); // 3 / 2 floored
    }

    #[test]
    fn monthly_breakdown_tracks_media_mix() {
        let posts = vec![
            post("A", 10, 1, 4, MediaType::Image),
            post("B", 20, 2, 4, MediaType::Video),
            post("C", 30, 3, 5, MediaType::Image),
        ];
        let breakdown = monthly_breakdown(&posts);

        let april = &breakdown["2026-04"];
        assert_eq!(april.posts, 2);
        assert_eq!(april.total_likes, 30);
        assert_eq!(april.avg_likes, 15);
        assert_eq!(april.media_mix["image"], 1);
        assert_eq!(april.media_mix["video"], 1);

        let months: Vec<&String> = breakdown.keys().collect();
        assert_eq!(months, vec!["2026-04", "2026-05"]);
    }
}
