//! Scraper item → validated post record.

use apify_client::InstagramPost;
use chrono::{DateTime, Utc};

use gramsight_common::{MediaType, Post};

use crate::extract::{extract_hashtags, extract_keywords, extract_mentions, extract_themes};

/// Map the scraper's media type string onto our enum. Unknown values
/// default to image, matching how the platform treats legacy items.
pub fn media_type_from(raw: Option<&str>) -> MediaType {
    match raw.map(|s| s.to_lowercase()).as_deref() {
        Some("video") | Some("graphvideo") => MediaType::Video,
        Some("sidecar") | Some("graphsidecar") | Some("carousel") => MediaType::Carousel,
        _ => MediaType::Image,
    }
}

/// Normalize one scraped item into a post record.
///
/// Returns `None` for items that cannot enter the collection: no usable
/// post id, no timestamp, or older than the cutoff.
pub fn normalize(item: &InstagramPost, account: &str, cutoff: DateTime<Utc>) -> Option<Post> {
    let timestamp = item.timestamp?;
    if timestamp < cutoff {
        return None;
    }
    let post_id = item.short_code.clone().filter(|s| !s.is_empty())?;

    let caption = item.caption.clone().unwrap_or_default();
    let hashtags = extract_hashtags(&caption, item.hashtags.as_deref().unwrap_or_default());
    let mentions = extract_mentions(
        &caption,
        item.mentions.as_deref().unwrap_or_default(),
        account,
    );
    let keywords = extract_keywords(&caption);
    let (themes, theme_scores) = extract_themes(&caption, &hashtags);

    let url = item
        .url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("https://www.instagram.com/p/{post_id}/"));

    Some(Post {
        month: Post::month_key(&timestamp),
        post_id,
        url,
        caption: if caption.is_empty() { None } else { Some(caption) },
        hashtags,
        mentions,
        keywords,
        themes,
        theme_scores,
        like_count: item.likes_count.unwrap_or(0).max(0) as u64,
        comment_count: item.comments_count.unwrap_or(0).max(0) as u64,
        media_type: media_type_from(item.post_type.as_deref()),
        timestamp,
    })
}

/// Normalize a batch, dropping unusable items and deduplicating by post_id
/// (first occurrence wins, preserving scrape order).
pub fn normalize_batch(
    items: &[InstagramPost],
    account: &str,
    cutoff: DateTime<Utc>,
) -> Vec<Post> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter_map(|item| normalize(item, account, cutoff))
        .filter(|post| seen.insert(post.post_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, caption: &str, ts: Option<DateTime<Utc>>) -> InstagramPost {
        InstagramPost {
            caption: Some(caption.to_string()),
            owner_username: Some("acme".to_string()),
            url: None,
            short_code: Some(id.to_string()),
            likes_count: Some(42),
            comments_count: Some(7),
            timestamp: ts,
            post_type: Some("Image".to_string()),
            hashtags: None,
            mentions: None,
        }
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn normalize_fills_derived_fields() {
        let post = normalize(&item("ABC", "Go #run with @coach", Some(ts(10))), "acme", ts(1))
            .unwrap();

        assert_eq!(post.post_id, "ABC");
        assert_eq!(post.url, "https://www.instagram.com/p/ABC/");
        assert_eq!(post.month, "2026-06");
        assert_eq!(post.hashtags, vec!["run"]);
        assert_eq!(post.mentions, vec!["coach"]);
        assert_eq!(post.like_count, 42);
        assert_eq!(post.media_type, MediaType::Image);
        assert_eq!(post.themes, vec!["running"]);
    }

    #[test]
    fn items_before_cutoff_are_dropped() {
        assert!(normalize(&item("OLD", "c", Some(ts(1))), "acme", ts(5)).is_none());
    }

    #[test]
    fn items_without_timestamp_or_id_are_dropped() {
        assert!(normalize(&item("X", "c", None), "acme", ts(1)).is_none());

        let mut no_id = item("", "c", Some(ts(10)));
        no_id.short_code = Some(String::new());
        assert!(normalize(&no_id, "acme", ts(1)).is_none());
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let mut raw = item("NEG", "c", Some(ts(10)));
        raw.likes_count = Some(-5);
        let post = normalize(&raw, "acme", ts(1)).unwrap();
        assert_eq!(post.like_count, 0);
    }

    #[test]
    fn media_type_mapping_covers_scraper_variants() {
        assert_eq!(media_type_from(Some("Video")), MediaType::Video);
        assert_eq!(media_type_from(Some("GraphSidecar")), MediaType::Carousel);
        assert_eq!(media_type_from(Some("Image")), MediaType::Image);
        assert_eq!(media_type_from(Some("unknown")), MediaType::Image);
        assert_eq!(media_type_from(None), MediaType::Image);
    }

    #[test]
    fn batch_deduplicates_keeping_first() {
        let items = vec![
            item("DUP", "first", Some(ts(10))),
            item("DUP", "second", Some(ts(11))),
            item("OTHER", "third", Some(ts(12))),
        ];
        let posts = normalize_batch(&items, "acme", ts(1));
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].post_id, "DUP");
        assert_eq!(posts[0].caption.as_deref(), Some("first"));
    }

    #[test]
    fn empty_caption_becomes_none() {
        let mut raw = item("EMPTY", "", Some(ts(10)));
        raw.caption = Some(String::new());
        let post = normalize(&raw, "acme", ts(1)).unwrap();
        assert!(post.caption.is_none());
    }
}
