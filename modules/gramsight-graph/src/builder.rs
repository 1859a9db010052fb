//! Graph construction: snapshot-or-rebuild with local recovery.

use tracing::{info, warn};

use gramsight_common::{GramsightError, Post};

use crate::graph::{BrandGraph, GraphNode, Relation};
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::store::PostStore;

/// Builds an account's knowledge graph, reusing the on-disk snapshot when
/// it is present and valid.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    posts: PostStore,
    snapshots: SnapshotStore,
}

impl GraphBuilder {
    pub fn new(posts: PostStore, snapshots: SnapshotStore) -> Self {
        Self { posts, snapshots }
    }

    /// Return the account's graph.
    ///
    /// Unless `force_rebuild` is set, a valid cached snapshot wins. A
    /// snapshot that fails to load is discarded and rebuilt locally — never
    /// surfaced to the caller. Missing post data is a precondition failure
    /// and does propagate.
    pub fn build(&self, account: &str, force_rebuild: bool) -> Result<BrandGraph, GramsightError> {
        if !force_rebuild {
            match self.snapshots.load_graph(account) {
                Ok(graph) => return Ok(graph),
                Err(SnapshotError::Missing) => {}
                Err(e) => {
                    warn!(account, error = %e, "Graph snapshot unreadable, rebuilding");
                    self.snapshots.discard_graph(account);
                }
            }
        }

        let posts = self.posts.load(account)?;
        info!(account, posts = posts.len(), "Building graph");

        let graph = build_from_posts(account, &posts);

        self.snapshots.save_graph(account, &graph)?;
        info!(
            account,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph built and persisted"
        );
        Ok(graph)
    }
}

/// Construct the whole graph from a post collection, in input order.
///
/// Every post gets exactly one POSTED edge in from the brand and exactly
/// one BELONGS_TO and IS_TYPE edge out; shared nodes are created the first
/// time they are referenced and only referenced afterwards.
pub fn build_from_posts(account: &str, posts: &[Post]) -> BrandGraph {
    let mut graph = BrandGraph::new(account);
    let brand = graph.brand_index();

    for post in posts {
        let post_idx = graph.ensure_node(GraphNode::Post {
            post_id: post.post_id.clone(),
            url: post.url.clone(),
            caption: post.caption.clone(),
            like_count: post.like_count,
            comment_count: post.comment_count,
            media_type: post.media_type,
            timestamp: post.timestamp,
            month: post.month.clone(),
        });
        graph.add_edge(brand, post_idx, Relation::Posted);

        for tag in &post.hashtags {
            let tag_idx = graph.ensure_node(GraphNode::Hashtag { tag: tag.clone() });
            graph.add_edge(post_idx, tag_idx, Relation::HasHashtag);
        }

        for name in &post.mentions {
            let mention_idx = graph.ensure_node(GraphNode::Mention { name: name.clone() });
            graph.add_edge(post_idx, mention_idx, Relation::Mentions);
        }

        for theme in &post.themes {
            let theme_idx = graph.ensure_node(GraphNode::Theme {
                theme: theme.clone(),
            });
            graph.add_edge(post_idx, theme_idx, Relation::Theme);
        }

        let month_idx = graph.ensure_node(GraphNode::Month {
            month: post.month.clone(),
        });
        graph.add_edge(post_idx, month_idx, Relation::BelongsTo);

        let media_idx = graph.ensure_node(GraphNode::MediaKind {
            media: post.media_type,
        });
        graph.add_edge(post_idx, media_idx, Relation::IsType);
    }

    graph
}
