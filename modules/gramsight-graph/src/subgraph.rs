//! Filtered node/edge views for external renderers, plus the multi-account
//! comparison view where shared hashtag/theme/month/media nodes merge
//! across brands.

use serde::{Deserialize, Serialize};

use gramsight_common::{MediaType, Post};

use crate::graph::title_case;

const NODE_CAPTION_CHARS: usize = 120;

const BRAND_SIZE: i64 = 50;
const HASHTAG_SIZE: i64 = 14;
const MENTION_SIZE: i64 = 16;
const THEME_SIZE: i64 = 22;
const MONTH_SIZE: i64 = 24;
const MEDIA_SIZE: i64 = 20;

/// Optional, independently applicable, conjunctive post filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubgraphFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_likes: Option<u64>,
}

impl SubgraphFilters {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(month) = &self.month {
            if &post.month != month {
                return false;
            }
        }
        if let Some(media_type) = self.media_type {
            if post.media_type != media_type {
                return false;
            }
        }
        if let Some(min_likes) = self.min_likes {
            if post.like_count < min_likes {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub group: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl VisNode {
    fn shared(id: String, label: String, group: &str, size: i64) -> Self {
        Self {
            id,
            label,
            group: group.to_string(),
            size,
            like_count: None,
            comment_count: None,
            media_type: None,
            url: None,
            caption: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphMeta {
    pub total_posts: u64,
    pub total_hashtags: u64,
    pub total_mentions: u64,
    pub total_themes: u64,
    pub filters_applied: SubgraphFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
    pub meta: SubgraphMeta,
}

/// Single-account view. Node ids use the graph's raw key scheme.
pub fn extract_subgraph(handle: &str, posts: &[Post], filters: &SubgraphFilters) -> Subgraph {
    let filtered: Vec<&Post> = posts.iter().filter(|p| filters.matches(p)).collect();
    let mut builder = ViewBuilder::new(max_likes(&filtered));
    builder.add_brand(handle);
    for post in &filtered {
        builder.add_post(handle, post, false);
    }
    builder.finish(filtered.len() as u64, filters.clone())
}

/// Multi-account comparison view. Post node ids are namespaced per account
/// so two brands' posts never collide; shared nodes keep their raw keys and
/// merge, which is what surfaces cross-account overlap.
pub fn extract_comparison_subgraph(
    accounts: &[(String, Vec<Post>)],
    filters: &SubgraphFilters,
) -> Subgraph {
    let filtered: Vec<(&str, Vec<&Post>)> = accounts
        .iter()
        .map(|(handle, posts)| {
            (
                handle.as_str(),
                posts.iter().filter(|p| filters.matches(p)).collect(),
            )
        })
        .collect();

    let all: Vec<&Post> = filtered.iter().flat_map(|(_, ps)| ps.iter().copied()).collect();
    let mut builder = ViewBuilder::new(max_likes(&all));
    for (handle, posts) in &filtered {
        builder.add_brand(handle);
        for post in posts {
            builder.add_post(handle, post, true);
        }
    }
    builder.finish(all.len() as u64, filters.clone())
}

fn max_likes(posts: &[&Post]) -> u64 {
    posts.iter().map(|p| p.like_count).max().unwrap_or(1)
}

/// Accumulates nodes and edges, deduplicating shared nodes by id.
struct ViewBuilder {
    nodes: Vec<VisNode>,
    edges: Vec<VisEdge>,
    seen: std::collections::HashSet<String>,
    max_likes: u64,
}

impl ViewBuilder {
    fn new(max_likes: u64) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            seen: std::collections::HashSet::new(),
            max_likes,
        }
    }

    fn add_brand(&mut self, handle: &str) {
        self.nodes.push(VisNode::shared(
            handle.to_string(),
            handle.to_string(),
            "brand",
            BRAND_SIZE,
        ));
    }

    /// Emit the post node and all its edges, creating shared nodes on first
    /// reference.
    fn add_post(&mut self, handle: &str, post: &Post, namespace_post: bool) {
        let post_id = if namespace_post {
            format!("{handle}:{}", post.post_id)
        } else {
            post.post_id.clone()
        };
        let short: String = post.post_id.chars().take(8).collect();

        // Linear scale anchored so the most-liked filtered post reaches the
        // maximum size.
        let size = (12.0 + 30.0 * post.like_count as f64 / self.max_likes.max(1) as f64) as i64;

        self.nodes.push(VisNode {
            id: post_id.clone(),
            label: format!("Post\n{short}"),
            group: "post".to_string(),
            size,
            like_count: Some(post.like_count),
            comment_count: Some(post.comment_count),
            media_type: Some(post.media_type),
            url: Some(post.url.clone()),
            caption: Some(post.caption_preview(NODE_CAPTION_CHARS)),
        });
        self.edge(handle, &post_id, "POSTED");

        for tag in &post.hashtags {
            let id = format!("#{tag}");
            self.ensure_shared(&id, id.clone(), "hashtag", HASHTAG_SIZE);
            self.edge(&post_id, &id, "HAS_HASHTAG");
        }

        for name in &post.mentions {
            let id = format!("@{name}");
            self.ensure_shared(&id, id.clone(), "mention", MENTION_SIZE);
            self.edge(&post_id, &id, "MENTIONS");
        }

        for theme in &post.themes {
            let id = format!("theme:{theme}");
            let label = title_case(theme);
            self.ensure_shared(&id, label, "theme", THEME_SIZE);
            self.edge(&post_id, &id, "THEME");
        }

        let month_id = format!("month:{}", post.month);
        self.ensure_shared(&month_id, post.month.clone(), "month", MONTH_SIZE);
        self.edge(&post_id, &month_id, "BELONGS_TO");

        let media_id = format!("media:{}", post.media_type);
        self.ensure_shared(
            &media_id,
            post.media_type.as_str().to_uppercase(),
            "media_type",
            MEDIA_SIZE,
        );
        self.edge(&post_id, &media_id, "IS_TYPE");
    }

    fn ensure_shared(&mut self, id: &str, label: String, group: &str, size: i64) {
        if self.seen.insert(id.to_string()) {
            self.nodes
                .push(VisNode::shared(id.to_string(), label, group, size));
        }
    }

    fn edge(&mut self, from: &str, to: &str, label: &str) {
        self.edges.push(VisEdge {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
        });
    }

    fn finish(self, total_posts: u64, filters: SubgraphFilters) -> Subgraph {
        let count = |prefix: &str| {
            self.seen.iter().filter(|k| k.starts_with(prefix)).count() as u64
        };
        let meta = SubgraphMeta {
            total_posts,
            total_hashtags: count("#"),
            total_mentions: count("@"),
            total_themes: count("theme:"),
            filters_applied: filters,
        };
        Subgraph {
            nodes: self.nodes,
            edges: self.edges,
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: &str, likes: u64, month: u32, media: MediaType, tags: &[&str]) -> Post {
        let ts = Utc.with_ymd_and_hms(2026, month, 3, 0, 0, 0).unwrap();
        Post {
            post_id: id.into(),
            url: format!("https://www.instagram.com/p/{id}/"),
            caption: Some(format!("caption {id}")),
            hashtags: tags.iter().map(|s| s.to_string()).collect(),
            mentions: vec![],
            keywords: vec![],
            themes: vec!["running".into()],
            theme_scores: Default::default(),
            like_count: likes,
            comment_count: 0,
            media_type: media,
            timestamp: ts,
            month: format!("2026-{month:02}"),
        }
    }

    #[test]
    fn min_likes_filter_is_inclusive_and_conjunctive() {
        let posts = vec![
            post("A", 100, 5, MediaType::Image, &["run"]),
            post("B", 60, 5, MediaType::Video, &["run"]),
            post("C", 10, 5, MediaType::Image, &["gym"]),
        ];
        let filters = SubgraphFilters {
            min_likes: Some(60),
            media_type: Some(MediaType::Image),
            ..Default::default()
        };
        let sub = extract_subgraph("acme", &posts, &filters);
        assert_eq!(sub.meta.total_posts, 1);
        assert!(sub.nodes.iter().any(|n| n.id == "A"));
        assert!(!sub.nodes.iter().any(|n| n.id == "B"));
    }

    #[test]
    fn most_liked_post_reaches_maximum_size() {
        let posts = vec![
            post("A", 200, 5, MediaType::Image, &[]),
            post("B", 100, 5, MediaType::Image, &[]),
        ];
        let sub = extract_subgraph("acme", &posts, &SubgraphFilters::default());
        let a = sub.nodes.iter().find(|n| n.id == "A").unwrap();
        let b = sub.nodes.iter().find(|n| n.id == "B").unwrap();
        assert_eq!(a.size, 42); // 12 + 30 * 1.0
        assert_eq!(b.size, 27); // 12 + 30 * 0.5
    }

    #[test]
    fn size_scale_survives_all_zero_likes() {
        let posts = vec![post("A", 0, 5, MediaType::Image, &[])];
        let sub = extract_subgraph("acme", &posts, &SubgraphFilters::default());
        let a = sub.nodes.iter().find(|n| n.id == "A").unwrap();
        assert_eq!(a.size, 12);
    }

    #[test]
    fn shared_nodes_appear_once_with_one_edge_per_post() {
        let posts = vec![
            post("A", 1, 5, MediaType::Image, &["run"]),
            post("B", 2, 5, MediaType::Image, &["run"]),
        ];
        let sub = extract_subgraph("acme", &posts, &SubgraphFilters::default());

        let run_nodes = sub.nodes.iter().filter(|n| n.id == "#run").count();
        assert_eq!(run_nodes, 1);
        let run_edges = sub.edges.iter().filter(|e| e.to == "#run").count();
        assert_eq!(run_edges, 2);
    }

    #[test]
    fn meta_counts_distinct_shared_nodes() {
        let posts = vec![
            post("A", 1, 5, MediaType::Image, &["run", "gym"]),
            post("B", 2, 5, MediaType::Image, &["run"]),
        ];
        let sub = extract_subgraph("acme", &posts, &SubgraphFilters::default());
        assert_eq!(sub.meta.total_posts, 2);
        assert_eq!(sub.meta.total_hashtags, 2);
        assert_eq!(sub.meta.total_mentions, 0);
        assert_eq!(sub.meta.total_themes, 1);
    }

    #[test]
    fn filters_applied_round_trips_in_meta() {
        let filters = SubgraphFilters {
            month: Some("2026-05".into()),
            ..Default::default()
        };
        let sub = extract_subgraph("acme", &[], &filters);
        assert_eq!(sub.meta.filters_applied, filters);
    }

    #[test]
    fn comparison_namespaces_posts_but_merges_shared_nodes() {
        let accounts = vec![
            ("acme".to_string(), vec![post("P1", 10, 5, MediaType::Image, &["run"])]),
            ("zenith".to_string(), vec![post("P1", 20, 5, MediaType::Image, &["run"])]),
        ];
        let sub = extract_comparison_subgraph(&accounts, &SubgraphFilters::default());

        // Same post_id under both brands, kept apart by namespacing.
        assert!(sub.nodes.iter().any(|n| n.id == "acme:P1"));
        assert!(sub.nodes.iter().any(|n| n.id == "zenith:P1"));

        // One merged hashtag node with an edge from each brand's post.
        assert_eq!(sub.nodes.iter().filter(|n| n.id == "#run").count(), 1);
        let sources: Vec<&str> = sub
            .edges
            .iter()
            .filter(|e| e.to == "#run")
            .map(|e| e.from.as_str())
            .collect();
        assert_eq!(sources, vec!["acme:P1", "zenith:P1"]);
    }

    #[test]
    fn comparison_size_scale_is_anchored_globally() {
        let accounts = vec![
            ("acme".to_string(), vec![post("P1", 50, 5, MediaType::Image, &[])]),
            ("zenith".to_string(), vec![post("P2", 100, 5, MediaType::Image, &[])]),
        ];
        let sub = extract_comparison_subgraph(&accounts, &SubgraphFilters::default());
        let p2 = sub.nodes.iter().find(|n| n.id == "zenith:P2").unwrap();
        let p1 = sub.nodes.iter().find(|n| n.id == "acme:P1").unwrap();
        assert_eq!(p2.size, 42);
        assert_eq!(p1.size, 27);
    }
}
