//! Aggregate read-models: everything an external caller (CLI, renderer,
//! tool-calling agent) needs about an account or an account set, in one
//! payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gramsight_common::Post;

use crate::analytics::{
    engagement_summary, hashtag_analysis, monthly_breakdown, EngagementSummary, HashtagAnalysis,
    MonthlyStats,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountContext {
    pub brand: String,
    /// Covered date range, `YYYY-MM-DD to YYYY-MM-DD`.
    pub period: String,
    pub engagement: EngagementSummary,
    pub hashtags: HashtagAnalysis,
    pub monthly: BTreeMap<String, MonthlyStats>,
    pub posts: Vec<Post>,
}

/// A label carried by posts of more than one account, with per-account
/// post counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapEntry {
    pub label: String,
    pub accounts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapSummary {
    pub hashtags: Vec<OverlapEntry>,
    pub themes: Vec<OverlapEntry>,
    pub mentions: Vec<OverlapEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonContext {
    pub accounts: BTreeMap<String, AccountContext>,
    pub overlap: OverlapSummary,
}

/// Build the single-account read-model. `None` for an empty collection.
pub fn account_context(handle: &str, posts: &[Post]) -> Option<AccountContext> {
    let engagement = engagement_summary(posts)?;
    Some(AccountContext {
        brand: handle.to_string(),
        period: period_label(posts),
        engagement,
        hashtags: hashtag_analysis(posts),
        monthly: monthly_breakdown(posts),
        posts: posts.to_vec(),
    })
}

/// Combine per-account contexts with the cross-account overlap summary.
/// Callers guarantee at least two accounts, each non-empty.
pub fn comparison_context(accounts: &[(String, Vec<Post>)]) -> ComparisonContext {
    let contexts: BTreeMap<String, AccountContext> = accounts
        .iter()
        .filter_map(|(handle, posts)| {
            account_context(handle, posts).map(|ctx| (handle.clone(), ctx))
        })
        .collect();

    let overlap = OverlapSummary {
        hashtags: overlap_entries(accounts, |p| p.hashtags.iter()),
        themes: overlap_entries(accounts, |p| p.themes.iter()),
        mentions: overlap_entries(accounts, |p| p.mentions.iter()),
    };

    ComparisonContext {
        accounts: contexts,
        overlap,
    }
}

fn period_label(posts: &[Post]) -> String {
    let mut timestamps: Vec<_> = posts.iter().map(|p| p.timestamp).collect();
    timestamps.sort_unstable();
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        _ => String::new(),
    }
}

/// Labels appearing in at least two accounts, sorted, with per-account post
/// counts.
fn overlap_entries<'a, F, I>(accounts: &'a [(String, Vec<Post>)], select: F) -> Vec<OverlapEntry>
where
    F: Fn(&'a Post) -> I,
    I: Iterator<Item = &'a String>,
{
    let mut per_label: BTreeMap<&str, BTreeMap<String, u64>> = BTreeMap::new();
    for (handle, posts) in accounts {
        for post in posts {
            for label in select(post) {
                *per_label
                    .entry(label.as_str())
                    .or_default()
                    .entry(handle.clone())
                    .or_default() += 1;
            }
        }
    }

    per_label
        .into_iter()
        .filter(|(_, counts)| counts.len() >= 2)
        .map(|(label, counts)| OverlapEntry {
            label: label.to_string(),
            accounts: counts,
        })
        .collect()
}
