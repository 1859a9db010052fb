//! Byte-level per-account snapshot files for the graph and the embedding
//! record. Snapshots are caches: a load failure is a typed reason the
//! builder consumes by discarding and rebuilding, never an error callers
//! see.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::embeddings::EmbeddingRecord;
use crate::graph::BrandGraph;

const GRAPH_FILE: &str = "graph.snapshot";
const EMBEDDINGS_FILE: &str = "embeddings.snapshot";

/// Why a snapshot could not be loaded. `Missing` is the normal cold-start
/// case; the other variants indicate a corrupt or foreign file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot not present")]
    Missing,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot does not decode to the expected shape: {0}")]
    Decode(String),
}

/// Per-account snapshot files under the data root.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, account: &str, file: &str) -> PathBuf {
        self.root.join(account).join(file)
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, SnapshotError> {
        if !path.exists() {
            return Err(SnapshotError::Missing);
        }
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = bincode::serialize(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, bytes)
    }

    /// Load the account's graph snapshot. A decoded graph whose brand node
    /// does not match the account is treated as a shape failure.
    pub fn load_graph(&self, account: &str) -> Result<BrandGraph, SnapshotError> {
        let graph: BrandGraph = self.load(&self.path(account, GRAPH_FILE))?;
        if graph.handle() != account {
            return Err(SnapshotError::Decode(format!(
                "snapshot belongs to {:?}, expected {:?}",
                graph.handle(),
                account
            )));
        }
        debug!(
            account,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Loaded graph snapshot"
        );
        Ok(graph)
    }

    pub fn save_graph(&self, account: &str, graph: &BrandGraph) -> std::io::Result<()> {
        self.save(&self.path(account, GRAPH_FILE), graph)?;
        debug!(
            account,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Saved graph snapshot"
        );
        Ok(())
    }

    /// Remove a snapshot that failed to load. Best-effort: a failed unlink
    /// only warns, the rebuild overwrites the file anyway.
    pub fn discard_graph(&self, account: &str) {
        let path = self.path(account, GRAPH_FILE);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(account, error = %e, "Could not remove stale graph snapshot");
            }
        }
    }

    pub fn load_embeddings(&self, account: &str) -> Result<EmbeddingRecord, SnapshotError> {
        self.load(&self.path(account, EMBEDDINGS_FILE))
    }

    pub fn save_embeddings(
        &self,
        account: &str,
        record: &EmbeddingRecord,
    ) -> std::io::Result<()> {
        self.save(&self.path(account, EMBEDDINGS_FILE), record)?;
        debug!(
            account,
            vectors = record.post_ids.len(),
            model = %record.model,
            "Saved embedding snapshot"
        );
        Ok(())
    }
}
