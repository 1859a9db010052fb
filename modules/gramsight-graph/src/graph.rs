//! The typed knowledge graph over one account's posts.
//!
//! Nodes are typed (brand, post, hashtag, mention, theme, month, media
//! type) and every edge carries a relation label. Shared nodes are created
//! once and referenced by every post that touches them; post nodes carry
//! the scalar attributes analytics and rendering need.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use gramsight_common::MediaType;

/// Directed edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    Posted,
    HasHashtag,
    Mentions,
    Theme,
    BelongsTo,
    IsType,
}

impl Relation {
    /// Wire/display form, matching the relation names in rendered views.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Posted => "POSTED",
            Relation::HasHashtag => "HAS_HASHTAG",
            Relation::Mentions => "MENTIONS",
            Relation::Theme => "THEME",
            Relation::BelongsTo => "BELONGS_TO",
            Relation::IsType => "IS_TYPE",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed node. The key uniquely identifies a node within one graph:
/// brand = handle, post = post_id, hashtag = `#tag`, mention = `@name`,
/// theme = `theme:<label>`, month = `month:<YYYY-MM>`, media = `media:<type>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphNode {
    Brand {
        handle: String,
    },
    Post {
        post_id: String,
        url: String,
        caption: Option<String>,
        like_count: u64,
        comment_count: u64,
        media_type: MediaType,
        timestamp: DateTime<Utc>,
        month: String,
    },
    Hashtag {
        tag: String,
    },
    Mention {
        name: String,
    },
    Theme {
        theme: String,
    },
    Month {
        month: String,
    },
    MediaKind {
        media: MediaType,
    },
}

impl GraphNode {
    pub fn key(&self) -> String {
        match self {
            GraphNode::Brand { handle } => handle.clone(),
            GraphNode::Post { post_id, .. } => post_id.clone(),
            GraphNode::Hashtag { tag } => format!("#{tag}"),
            GraphNode::Mention { name } => format!("@{name}"),
            GraphNode::Theme { theme } => format!("theme:{theme}"),
            GraphNode::Month { month } => format!("month:{month}"),
            GraphNode::MediaKind { media } => format!("media:{media}"),
        }
    }

    /// Node type name used as the rendering group.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphNode::Brand { .. } => "brand",
            GraphNode::Post { .. } => "post",
            GraphNode::Hashtag { .. } => "hashtag",
            GraphNode::Mention { .. } => "mention",
            GraphNode::Theme { .. } => "theme",
            GraphNode::Month { .. } => "month",
            GraphNode::MediaKind { .. } => "media_type",
        }
    }

    /// Human-readable label for rendered views.
    pub fn label(&self) -> String {
        match self {
            GraphNode::Brand { handle } => handle.clone(),
            GraphNode::Post { post_id, .. } => {
                let short: String = post_id.chars().take(8).collect();
                format!("Post:{short}")
            }
            GraphNode::Hashtag { tag } => format!("#{tag}"),
            GraphNode::Mention { name } => format!("@{name}"),
            GraphNode::Theme { theme } => title_case(theme),
            GraphNode::Month { month } => month.clone(),
            GraphNode::MediaKind { media } => media.as_str().to_uppercase(),
        }
    }
}

/// `snake_case_label` → `Snake Case Label`.
pub(crate) fn title_case(label: &str) -> String {
    label
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One account's knowledge graph: a stable directed graph plus a key index
/// for O(1) node lookup. Nodes are never removed once added — rebuilds are
/// always whole-graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandGraph {
    handle: String,
    graph: StableDiGraph<GraphNode, Relation>,
    keys: HashMap<String, NodeIndex>,
}

impl BrandGraph {
    /// Create a graph containing only the brand node.
    pub fn new(handle: impl Into<String>) -> Self {
        let handle = handle.into();
        let mut graph = StableDiGraph::new();
        let mut keys = HashMap::new();
        let brand = GraphNode::Brand {
            handle: handle.clone(),
        };
        let idx = graph.add_node(brand.clone());
        keys.insert(brand.key(), idx);
        Self {
            handle,
            graph,
            keys,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn brand_index(&self) -> NodeIndex {
        self.keys[&self.handle]
    }

    /// Insert the node if its key is new, otherwise return the existing index.
    pub fn ensure_node(&mut self, node: GraphNode) -> NodeIndex {
        let key = node.key();
        if let Some(&idx) = self.keys.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.keys.insert(key, idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, relation: Relation) {
        self.graph.add_edge(from, to, relation);
    }

    pub fn node_by_key(&self, key: &str) -> Option<&GraphNode> {
        self.keys.get(key).map(|&idx| &self.graph[idx])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Outgoing `(relation, target)` pairs for the node with the given key.
    pub fn outgoing(&self, key: &str) -> Vec<(Relation, &GraphNode)> {
        let Some(&idx) = self.keys.get(key) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (*e.weight(), &self.graph[e.target()]))
            .collect()
    }

    /// Incoming `(relation, source)` pairs for the node with the given key.
    pub fn incoming(&self, key: &str) -> Vec<(Relation, &GraphNode)> {
        let Some(&idx) = self.keys.get(key) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (*e.weight(), &self.graph[e.source()]))
            .collect()
    }

    /// All node keys, sorted. Used to compare graphs structurally.
    pub fn node_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// All edges as sorted `(source_key, relation, target_key)` triples.
    /// Used to compare graphs structurally.
    pub fn edge_triples(&self) -> Vec<(String, Relation, String)> {
        let mut triples: Vec<(String, Relation, String)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].key(),
                    *e.weight(),
                    self.graph[e.target()].key(),
                )
            })
            .collect();
        triples.sort();
        triples
    }
}
