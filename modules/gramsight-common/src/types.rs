use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Carousel,
}

impl MediaType {
    /// Stable lowercase identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Carousel => "carousel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "carousel" => Some(MediaType::Carousel),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- Post record ---

/// One normalized Instagram post. Produced by the ingest pipeline, read-only
/// to the graph/analytics core.
///
/// `hashtags` and `mentions` are lowercase, sigil-stripped, sorted, and
/// deduplicated. `month` is always the calendar-month prefix of `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub theme_scores: BTreeMap<String, f64>,
    pub like_count: u64,
    pub comment_count: u64,
    pub media_type: MediaType,
    pub timestamp: DateTime<Utc>,
    pub month: String,
}

impl Post {
    /// The `YYYY-MM` month key for a timestamp.
    pub fn month_key(ts: &DateTime<Utc>) -> String {
        format!("{:04}-{:02}", ts.year(), ts.month())
    }

    /// Caption text truncated to `max` characters (char boundary safe).
    pub fn caption_preview(&self, max: usize) -> String {
        let caption = self.caption.as_deref().unwrap_or("");
        caption.chars().take(max).collect()
    }
}

/// Validate a single post record against the invariants the core relies on.
pub fn validate_post(post: &Post) -> Result<(), ValidationError> {
    if post.post_id.is_empty() {
        return Err(ValidationError::EmptyPostId);
    }
    if post.month != Post::month_key(&post.timestamp) {
        return Err(ValidationError::MonthMismatch {
            post_id: post.post_id.clone(),
            month: post.month.clone(),
            expected: Post::month_key(&post.timestamp),
        });
    }
    for (theme, score) in &post.theme_scores {
        if !(0.0..=1.0).contains(score) {
            return Err(ValidationError::ThemeScoreOutOfRange {
                post_id: post.post_id.clone(),
                theme: theme.clone(),
                score: *score,
            });
        }
    }
    Ok(())
}

/// Validate a whole collection: every record individually, plus post_id
/// uniqueness across the collection.
pub fn validate_posts(posts: &[Post]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(posts.len());
    for post in posts {
        validate_post(post)?;
        if !seen.insert(post.post_id.as_str()) {
            return Err(ValidationError::DuplicatePostId(post.post_id.clone()));
        }
    }
    Ok(())
}
