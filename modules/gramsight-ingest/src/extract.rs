//! Pure caption extraction: hashtags, mentions, keywords, and campaign
//! themes. Everything here is deterministic — the same caption always
//! yields the same labels and scores.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("valid regex"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid regex"));
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]{4,}").expect("valid regex"));

/// Words ignored during keyword extraction.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "is",
        "it", "its", "this", "that", "be", "are", "was", "were", "has", "have", "had", "do",
        "did", "will", "would", "could", "should", "may", "might", "just", "so", "get", "all",
        "as", "by", "from", "not", "we", "you", "your", "our", "their", "my", "me", "us", "what",
        "how", "who", "when", "where", "why", "up", "out", "if", "no", "more", "than", "into",
        "about", "over", "new", "one", "can", "now", "i", "he", "she", "they", "make", "like",
        "know", "go", "come", "see", "time", "only", "also", "then", "them",
    ]
    .into_iter()
    .collect()
});

/// Campaign theme → trigger keywords. A theme is assigned when any of its
/// keywords appears in the caption or hashtags; its score is the matched
/// fraction of the keyword list.
static THEME_MAP: Lazy<Vec<(&'static str, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            "olympics",
            vec!["olympics", "olympic", "milanocortina2026", "paris2024", "la2028", "athlete", "gold", "medal"],
        ),
        (
            "running",
            vec!["run", "running", "runner", "marathon", "5k", "10k", "pace", "sprint", "track", "road"],
        ),
        (
            "basketball",
            vec!["basketball", "nba", "court", "hoop", "jordan", "airjordan", "lebron", "kobe"],
        ),
        (
            "training",
            vec!["train", "training", "workout", "gym", "fitness", "strength", "muscle", "lift", "sweat"],
        ),
        (
            "football",
            vec!["football", "soccer", "fifa", "worldcup", "pitch", "goal", "cleats"],
        ),
        (
            "sustainability",
            vec!["sustainable", "sustainability", "planet", "green", "recycle", "movetozero", "forward"],
        ),
        (
            "fashion",
            vec!["style", "fashion", "streetwear", "drip", "outfit", "fit", "look", "wear"],
        ),
        (
            "women",
            vec!["women", "woman", "girl", "she", "her", "female"],
        ),
        (
            "kids",
            vec!["kids", "child", "children", "future", "youth", "junior", "play"],
        ),
        (
            "just_do_it",
            vec!["justdoit", "justdo", "motivation", "inspire", "inspiration", "believe", "dream"],
        ),
        (
            "sneakers",
            vec!["airmax", "airforce", "af1", "sneaker", "sneakerhead", "kicks", "shoe"],
        ),
    ]
});

/// Combine scraper-provided tags with regex extraction from the caption.
/// Lowercased, sigils stripped, deduplicated, sorted.
pub fn extract_hashtags(caption: &str, scraper_tags: &[String]) -> Vec<String> {
    let mut tags: BTreeSet<String> = scraper_tags
        .iter()
        .map(|t| t.trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    for cap in HASHTAG_RE.captures_iter(caption) {
        tags.insert(cap[1].to_lowercase());
    }
    tags.into_iter().collect()
}

/// Extract @mentions, excluding the account's own handle.
pub fn extract_mentions(caption: &str, scraper_mentions: &[String], own_handle: &str) -> Vec<String> {
    let own = own_handle.to_lowercase();
    let mut mentions: BTreeSet<String> = scraper_mentions
        .iter()
        .map(|m| m.trim_start_matches('@').to_lowercase())
        .filter(|m| !m.is_empty() && *m != own)
        .collect();
    for cap in MENTION_RE.captures_iter(caption) {
        let name = cap[1].to_lowercase();
        if name != own {
            mentions.insert(name);
        }
    }
    mentions.into_iter().collect()
}

/// Meaningful single words from the caption: 4–20 characters, not a
/// stopword, not a URL fragment. Sorted and deduplicated.
pub fn extract_keywords(caption: &str) -> Vec<String> {
    let lower = caption.to_lowercase();
    let words: BTreeSet<String> = WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() <= 20 && !w.starts_with("http") && !STOP_WORDS.contains(w.as_str()))
        .collect();
    words.into_iter().collect()
}

/// Infer campaign themes from caption text plus hashtags. Returns themes in
/// table order with their matched-keyword fraction in [0, 1].
pub fn extract_themes(caption: &str, hashtags: &[String]) -> (Vec<String>, BTreeMap<String, f64>) {
    let combined = format!("{} {}", caption.to_lowercase(), hashtags.join(" "));

    let mut themes = Vec::new();
    let mut scores = BTreeMap::new();
    for (theme, keywords) in THEME_MAP.iter() {
        let matched = keywords.iter().filter(|kw| combined.contains(*kw)).count();
        if matched > 0 {
            themes.push(theme.to_string());
            scores.insert(theme.to_string(), matched as f64 / keywords.len() as f64);
        }
    }
    (themes, scores)
}
