pub mod analytics;
pub mod builder;
pub mod context;
pub mod embedder;
pub mod embeddings;
pub mod graph;
pub mod service;
pub mod similarity;
pub mod snapshot;
pub mod store;
pub mod subgraph;

pub use analytics::{EngagementSummary, HashtagAnalysis, MonthlyStats};
pub use builder::GraphBuilder;
pub use context::{AccountContext, ComparisonContext};
pub use embedder::OpenAiEmbedder;
pub use embeddings::EmbeddingRecord;
pub use graph::{BrandGraph, GraphNode, Relation};
pub use service::GramsightService;
pub use similarity::{SimilarityEngine, SimilarityMethod, SimilarityResult};
pub use snapshot::{SnapshotError, SnapshotStore};
pub use store::PostStore;
pub use subgraph::{Subgraph, SubgraphFilters};
