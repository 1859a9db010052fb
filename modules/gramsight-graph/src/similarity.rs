//! Caption similarity search: cosine over cached embeddings when the
//! backend can produce them, hashtag Jaccard overlap otherwise. Exactly one
//! method runs per query and the result always names it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gramsight_common::{GramsightError, MediaType, Post, TextEmbedder};

use crate::embeddings::{build_embeddings, EmbeddingRecord};
use crate::snapshot::{SnapshotError, SnapshotStore};

const RESULT_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    CaptionCosine,
    HashtagJaccard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarPost {
    pub post_id: String,
    pub similarity: f64,
    /// Only present on the hashtag-overlap path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_hashtags: Option<Vec<String>>,
    pub like_count: u64,
    pub media_type: MediaType,
    pub caption_preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub query_post_id: String,
    pub method: SimilarityMethod,
    /// True when the engine fell back to hashtag overlap because no
    /// embedding record could be produced.
    pub degraded: bool,
    pub similar_posts: Vec<SimilarPost>,
}

/// Ranks an account's posts against a query post.
pub struct SimilarityEngine {
    snapshots: SnapshotStore,
    embedder: Option<Arc<dyn TextEmbedder>>,
}

impl SimilarityEngine {
    pub fn new(snapshots: SnapshotStore, embedder: Option<Arc<dyn TextEmbedder>>) -> Self {
        Self {
            snapshots,
            embedder,
        }
    }

    /// Rank `posts` (the account's current collection) against `post_id`.
    ///
    /// Unknown ids are a precondition failure. Embedding staleness and
    /// backend failures are handled here: stale records are rebuilt, and
    /// when no record can be produced the engine degrades to hashtag
    /// overlap with `degraded` set in the result.
    pub async fn find_similar(
        &self,
        account: &str,
        posts: &[Post],
        post_id: &str,
        top_k: usize,
    ) -> Result<SimilarityResult, GramsightError> {
        let query = posts
            .iter()
            .find(|p| p.post_id == post_id)
            .ok_or_else(|| GramsightError::PostNotFound {
                account: account.to_string(),
                post_id: post_id.to_string(),
            })?;

        if let Some(record) = self.ensure_embeddings(account, posts).await {
            if let Some(ranked) = rank_by_cosine(posts, &record, post_id, top_k) {
                return Ok(SimilarityResult {
                    query_post_id: post_id.to_string(),
                    method: SimilarityMethod::CaptionCosine,
                    degraded: false,
                    similar_posts: ranked,
                });
            }
        }

        info!(account, post_id, "Ranking by hashtag overlap (degraded mode)");
        Ok(SimilarityResult {
            query_post_id: post_id.to_string(),
            method: SimilarityMethod::HashtagJaccard,
            degraded: true,
            similar_posts: rank_by_jaccard(posts, query, top_k),
        })
    }

    /// Return a fresh embedding record, rebuilding through the backend when
    /// the cache is missing, stale, or unreadable. `None` means no record
    /// can be produced and the caller must degrade.
    async fn ensure_embeddings(&self, account: &str, posts: &[Post]) -> Option<EmbeddingRecord> {
        let embedder = self.embedder.as_deref()?;

        match self.snapshots.load_embeddings(account) {
            Ok(record) if record.is_fresh(embedder.model_name(), posts) => return Some(record),
            Ok(record) => {
                info!(
                    account,
                    cached_model = %record.model,
                    "Embedding record stale, rebuilding"
                );
            }
            Err(SnapshotError::Missing) => {}
            Err(e) => {
                warn!(account, error = %e, "Embedding snapshot unreadable, rebuilding");
            }
        }

        match build_embeddings(posts, embedder).await {
            Ok(record) => {
                if let Err(e) = self.snapshots.save_embeddings(account, &record) {
                    warn!(account, error = %e, "Could not persist embedding record");
                }
                Some(record)
            }
            Err(e) => {
                warn!(account, error = %e, "Embedding backend unavailable, degrading");
                None
            }
        }
    }
}

/// Cosine ranking over pre-normalized vectors (plain dot product). Returns
/// `None` if the record has no vector for the query post.
fn rank_by_cosine(
    posts: &[Post],
    record: &EmbeddingRecord,
    query_id: &str,
    top_k: usize,
) -> Option<Vec<SimilarPost>> {
    let query_vec = record.vector_for(query_id)?;

    let mut scored: Vec<(f64, &Post)> = Vec::with_capacity(posts.len());
    for post in posts {
        if post.post_id == query_id {
            continue;
        }
        let Some(vec) = record.vector_for(&post.post_id) else {
            continue;
        };
        scored.push((dot(query_vec, vec), post));
    }

    // Stable sort: equal scores keep input order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);

    Some(
        scored
            .into_iter()
            .map(|(score, post)| SimilarPost {
                post_id: post.post_id.clone(),
                similarity: round4(score),
                shared_hashtags: None,
                like_count: post.like_count,
                media_type: post.media_type,
                caption_preview: post.caption_preview(RESULT_PREVIEW_CHARS),
            })
            .collect(),
    )
}

fn rank_by_jaccard(posts: &[Post], query: &Post, top_k: usize) -> Vec<SimilarPost> {
    let mut scored: Vec<(f64, Vec<String>, &Post)> = Vec::with_capacity(posts.len());
    for post in posts {
        if post.post_id == query.post_id {
            continue;
        }
        let (score, shared) = jaccard(&query.hashtags, &post.hashtags);
        scored.push((score, shared, post));
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);

    scored
        .into_iter()
        .map(|(score, shared, post)| SimilarPost {
            post_id: post.post_id.clone(),
            similarity: round4(score),
            shared_hashtags: Some(shared),
            like_count: post.like_count,
            media_type: post.media_type,
            caption_preview: post.caption_preview(RESULT_PREVIEW_CHARS),
        })
        .collect()
}

/// Jaccard similarity of two hashtag sets plus the sorted intersection.
/// An empty union scores 0.0.
pub fn jaccard(a: &[String], b: &[String]) -> (f64, Vec<String>) {
    let set_a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: BTreeSet<&str> = b.iter().map(String::as_str).collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return (0.0, Vec::new());
    }
    let shared: Vec<String> = set_a
        .intersection(&set_b)
        .map(|s| s.to_string())
        .collect();
    (shared.len() as f64 / union as f64, shared)
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: &str, tags: &[&str]) -> Post {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        Post {
            post_id: id.into(),
            url: String::new(),
            caption: Some(format!("caption {id}")),
            hashtags: tags.iter().map(|s| s.to_string()).collect(),
            mentions: vec![],
            keywords: vec![],
            themes: vec![],
            theme_scores: Default::default(),
            like_count: 3,
            comment_count: 0,
            media_type: MediaType::Image,
            timestamp: ts,
            month: "2026-05".into(),
        }
    }

    #[test]
    fn jaccard_bounds_and_empty_union() {
        let (zero, shared) = jaccard(&[], &[]);
        assert_eq!(zero, 0.0);
        assert!(shared.is_empty());

        let (full, shared) = jaccard(
            &["a".into(), "b".into()],
            &["a".into(), "b".into()],
        );
        assert_eq!(full, 1.0);
        assert_eq!(shared, vec!["a", "b"]);

        let (half, shared) = jaccard(&["a".into()], &["a".into(), "b".into()]);
        assert!((half - 0.5).abs() < 1e-12);
        assert_eq!(shared, vec!["a"]);
    }

    #[test]
    fn jaccard_ranking_excludes_query_and_caps_results() {
        let posts = vec![
            post("Q", &["run", "gym"]),
            post("A", &["run"]),
            post("B", &["run", "gym"]),
            post("C", &["yoga"]),
        ];
        let ranked = rank_by_jaccard(&posts, &posts[0], 2);

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.post_id != "Q"));
        assert_eq!(ranked[0].post_id, "B"); // exact overlap first
        assert_eq!(ranked[0].similarity, 1.0);
        assert_eq!(
            ranked[0].shared_hashtags.as_deref(),
            Some(&["gym".to_string(), "run".to_string()][..])
        );
    }

    #[test]
    fn jaccard_zero_k_returns_nothing() {
        let posts = vec![post("Q", &["run"]), post("A", &["run"])];
        assert!(rank_by_jaccard(&posts, &posts[0], 0).is_empty());
    }

    #[test]
    fn cosine_ranking_prefers_aligned_vectors_and_rounds() {
        let posts = vec![post("Q", &[]), post("A", &[]), post("B", &[])];
        let record = EmbeddingRecord {
            post_ids: vec!["Q".into(), "A".into(), "B".into()],
            vectors: vec![
                vec![1.0, 0.0],
                vec![0.6, 0.8],
                vec![1.0, 0.0],
            ],
            model: "m".into(),
        };
        let ranked = rank_by_cosine(&posts, &record, "Q", 5).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].post_id, "B");
        assert_eq!(ranked[0].similarity, 1.0);
        assert_eq!(ranked[1].post_id, "A");
        assert_eq!(ranked[1].similarity, 0.6);
        assert!(ranked[0].shared_hashtags.is_none());
    }

    #[test]
    fn cosine_ties_keep_input_order() {
        let posts = vec![post("Q", &[]), post("A", &[]), post("B", &[])];
        let record = EmbeddingRecord {
            post_ids: vec!["Q".into(), "A".into(), "B".into()],
            vectors: vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
            model: "m".into(),
        };
        let ranked = rank_by_cosine(&posts, &record, "Q", 5).unwrap();
        assert_eq!(ranked[0].post_id, "A");
        assert_eq!(ranked[1].post_id, "B");
    }

    #[test]
    fn cosine_returns_none_without_query_vector() {
        let posts = vec![post("Q", &[]), post("A", &[])];
        let record = EmbeddingRecord {
            post_ids: vec!["A".into()],
            vectors: vec![vec![1.0]],
            model: "m".into(),
        };
        assert!(rank_by_cosine(&posts, &record, "Q", 5).is_none());
    }
}
