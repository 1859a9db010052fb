//! Caption embedding records: built through the injected backend, cached
//! per account, reused only while fresh.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use gramsight_common::{Post, TextEmbedder};

/// Per-account embedding cache: post IDs, parallel unit-length vectors, and
/// the model that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub post_ids: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
    pub model: String,
}

impl EmbeddingRecord {
    /// Fresh iff the model matches the currently configured one and the
    /// recorded post-ID set equals the current collection's, order ignored.
    pub fn is_fresh(&self, model: &str, posts: &[Post]) -> bool {
        if self.model != model {
            return false;
        }
        let cached: HashSet<&str> = self.post_ids.iter().map(String::as_str).collect();
        let current: HashSet<&str> = posts.iter().map(|p| p.post_id.as_str()).collect();
        cached == current
    }

    pub fn vector_for(&self, post_id: &str) -> Option<&[f32]> {
        self.post_ids
            .iter()
            .position(|id| id == post_id)
            .map(|i| self.vectors[i].as_slice())
    }
}

/// Collapse runs of whitespace and trim: captions arrive with decorative
/// line breaks that would otherwise leak into the encoded text.
pub fn normalize_caption(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scale a vector to unit length so ranking reduces to a dot product.
/// Zero vectors are left untouched.
pub fn unit_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Encode every post's caption through the backend. Posts without a caption
/// are encoded from their post_id so the record stays parallel to the
/// collection.
pub async fn build_embeddings(
    posts: &[Post],
    embedder: &dyn TextEmbedder,
) -> Result<EmbeddingRecord> {
    let ids: Vec<String> = posts.iter().map(|p| p.post_id.clone()).collect();
    let texts: Vec<String> = posts
        .iter()
        .map(|p| match p.caption.as_deref() {
            Some(caption) if !caption.trim().is_empty() => normalize_caption(caption),
            _ => p.post_id.clone(),
        })
        .collect();

    info!(
        count = texts.len(),
        model = embedder.model_name(),
        "Building caption embeddings"
    );
    let mut vectors = embedder.embed_batch(texts).await?;
    anyhow::ensure!(
        vectors.len() == ids.len(),
        "embedding backend returned {} vectors for {} texts",
        vectors.len(),
        ids.len()
    );
    for vector in &mut vectors {
        unit_normalize(vector);
    }

    Ok(EmbeddingRecord {
        post_ids: ids,
        vectors,
        model: embedder.model_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gramsight_common::MediaType;

    fn post(id: &str, caption: Option<&str>) -> Post {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        Post {
            post_id: id.into(),
            url: String::new(),
            caption: caption.map(String::from),
            hashtags: vec![],
            mentions: vec![],
            keywords: vec![],
            themes: vec![],
            theme_scores: Default::default(),
            like_count: 0,
            comment_count: 0,
            media_type: MediaType::Image,
            timestamp: ts,
            month: "2026-05".into(),
        }
    }

    struct FixedEmbedder;

    #[async_trait::async_trait]
    impl TextEmbedder for FixedEmbedder {
        fn model_name(&self) -> &str {
            "fixed-test-model"
        }

        async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            // Length-derived vectors: deterministic and unnormalized.
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.0])
                .collect())
        }
    }

    #[test]
    fn normalize_caption_collapses_whitespace() {
        assert_eq!(normalize_caption("  a\n\n b\tc  "), "a b c");
    }

    #[test]
    fn unit_normalize_produces_unit_length() {
        let mut v = vec![3.0, 4.0];
        unit_normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unit_normalize_leaves_zero_vector() {
        let mut v = vec![0.0, 0.0];
        unit_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn build_embeddings_uses_post_id_when_caption_missing() {
        let posts = vec![post("LONG_POST_ID", None), post("B", Some("hi"))];
        let record = build_embeddings(&posts, &FixedEmbedder).await.unwrap();

        assert_eq!(record.model, "fixed-test-model");
        assert_eq!(record.post_ids, vec!["LONG_POST_ID", "B"]);
        // First text was the 12-char post_id, second the 2-char caption;
        // different lengths produce different (normalized) vectors.
        assert_ne!(record.vectors[0], record.vectors[1]);
    }

    #[tokio::test]
    async fn built_vectors_are_unit_length() {
        let posts = vec![post("A", Some("some caption"))];
        let record = build_embeddings(&posts, &FixedEmbedder).await.unwrap();
        let norm: f32 = record.vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn freshness_ignores_order_but_not_membership() {
        let record = EmbeddingRecord {
            post_ids: vec!["A".into(), "B".into()],
            vectors: vec![vec![1.0], vec![1.0]],
            model: "m".into(),
        };
        let same_reordered = vec![post("B", None), post("A", None)];
        let different = vec![post("A", None), post("C", None)];

        assert!(record.is_fresh("m", &same_reordered));
        assert!(!record.is_fresh("m", &different));
        assert!(!record.is_fresh("other-model", &same_reordered));
    }
}
