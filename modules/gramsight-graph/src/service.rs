//! The account-level surface external interfaces call. Every method loads
//! through the Post Store, maps empty/unknown inputs to structured
//! precondition errors, and delegates to the pure modules.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gramsight_common::{GramsightError, Post, TextEmbedder};

use crate::analytics::{self, EngagementSummary, HashtagAnalysis, MonthlyStats};
use crate::builder::GraphBuilder;
use crate::context::{self, AccountContext, ComparisonContext};
use crate::graph::BrandGraph;
use crate::similarity::{SimilarityEngine, SimilarityResult};
use crate::snapshot::SnapshotStore;
use crate::store::PostStore;
use crate::subgraph::{self, Subgraph, SubgraphFilters};

pub struct GramsightService {
    store: PostStore,
    builder: GraphBuilder,
    similarity: SimilarityEngine,
}

impl GramsightService {
    /// Wire the service over a data root. `embedder` is optional: without
    /// one, similarity queries run in their hashtag-overlap fallback mode.
    pub fn new(data_dir: impl AsRef<Path>, embedder: Option<Arc<dyn TextEmbedder>>) -> Self {
        let store = PostStore::new(data_dir.as_ref());
        let snapshots = SnapshotStore::new(data_dir.as_ref());
        Self {
            builder: GraphBuilder::new(store.clone(), snapshots.clone()),
            similarity: SimilarityEngine::new(snapshots, embedder),
            store,
        }
    }

    pub fn post_store(&self) -> &PostStore {
        &self.store
    }

    pub fn build_graph(
        &self,
        account: &str,
        force_rebuild: bool,
    ) -> Result<BrandGraph, GramsightError> {
        self.builder.build(account, force_rebuild)
    }

    pub fn engagement_summary(&self, account: &str) -> Result<EngagementSummary, GramsightError> {
        let posts = self.store.load(account)?;
        analytics::engagement_summary(&posts)
            .ok_or_else(|| GramsightError::NoPosts(account.to_string()))
    }

    pub fn hashtag_analysis(&self, account: &str) -> Result<HashtagAnalysis, GramsightError> {
        let posts = self.non_empty(account)?;
        Ok(analytics::hashtag_analysis(&posts))
    }

    pub fn monthly_breakdown(
        &self,
        account: &str,
    ) -> Result<BTreeMap<String, MonthlyStats>, GramsightError> {
        let posts = self.non_empty(account)?;
        Ok(analytics::monthly_breakdown(&posts))
    }

    pub async fn find_similar(
        &self,
        account: &str,
        post_id: &str,
        top_k: usize,
    ) -> Result<SimilarityResult, GramsightError> {
        let posts = self.store.load(account)?;
        self.similarity
            .find_similar(account, &posts, post_id, top_k)
            .await
    }

    pub fn extract_subgraph(
        &self,
        account: &str,
        filters: &SubgraphFilters,
    ) -> Result<Subgraph, GramsightError> {
        let posts = self.store.load(account)?;
        Ok(subgraph::extract_subgraph(account, &posts, filters))
    }

    pub fn extract_comparison_subgraph(
        &self,
        accounts: &[String],
        filters: &SubgraphFilters,
    ) -> Result<Subgraph, GramsightError> {
        let loaded = self.load_accounts(accounts)?;
        Ok(subgraph::extract_comparison_subgraph(&loaded, filters))
    }

    pub fn graph_context(&self, account: &str) -> Result<AccountContext, GramsightError> {
        let posts = self.store.load(account)?;
        context::account_context(account, &posts)
            .ok_or_else(|| GramsightError::NoPosts(account.to_string()))
    }

    pub fn comparison_context(
        &self,
        accounts: &[String],
    ) -> Result<ComparisonContext, GramsightError> {
        let loaded = self.load_accounts(accounts)?;
        for (handle, posts) in &loaded {
            if posts.is_empty() {
                return Err(GramsightError::NoPosts(handle.clone()));
            }
        }
        Ok(context::comparison_context(&loaded))
    }

    fn non_empty(&self, account: &str) -> Result<Vec<Post>, GramsightError> {
        let posts = self.store.load(account)?;
        if posts.is_empty() {
            return Err(GramsightError::NoPosts(account.to_string()));
        }
        Ok(posts)
    }

    /// Load every account in a comparison set; fewer than two accounts is a
    /// precondition failure.
    fn load_accounts(
        &self,
        accounts: &[String],
    ) -> Result<Vec<(String, Vec<Post>)>, GramsightError> {
        if accounts.len() < 2 {
            return Err(GramsightError::NotEnoughAccounts(accounts.len()));
        }
        accounts
            .iter()
            .map(|handle| Ok((handle.clone(), self.store.load(handle)?)))
            .collect()
    }
}
