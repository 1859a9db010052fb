use anyhow::Result;

/// Caption embedding backend, injected so the similarity engine can run
/// against a real API in production and a deterministic stub in tests.
///
/// Implementations must return one vector per input text, in input order.
#[async_trait::async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Identifier of the underlying model, recorded in embedding snapshots
    /// and compared on load to decide freshness.
    fn model_name(&self) -> &str;

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}
