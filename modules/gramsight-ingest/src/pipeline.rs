//! The ingest pipeline: scrape, normalize, validate, persist.

use apify_client::ApifyClient;
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;

use gramsight_common::GramsightError;
use gramsight_graph::PostStore;

use crate::normalize::normalize_batch;

/// What one ingest run produced, for logging and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub account: String,
    pub fetched: usize,
    pub kept: usize,
    pub hashtags: usize,
    pub mentions: usize,
    pub themes: usize,
}

pub struct IngestPipeline {
    client: ApifyClient,
    store: PostStore,
}

impl IngestPipeline {
    pub fn new(client: ApifyClient, store: PostStore) -> Self {
        Self { client, store }
    }

    /// Scrape the account's recent posts and replace its processed file.
    /// `days_back` bounds the window; items older than that are dropped
    /// during normalization.
    pub async fn run(
        &self,
        account: &str,
        limit: u32,
        days_back: i64,
    ) -> Result<IngestReport, GramsightError> {
        let items = self
            .client
            .scrape_instagram_posts(account, limit)
            .await
            .map_err(|e| GramsightError::Scraping(e.to_string()))?;

        let cutoff = Utc::now() - Duration::days(days_back);
        let posts = normalize_batch(&items, account, cutoff);
        self.store.save(account, &posts)?;

        let report = IngestReport {
            account: account.to_string(),
            fetched: items.len(),
            kept: posts.len(),
            hashtags: posts.iter().map(|p| p.hashtags.len()).sum(),
            mentions: posts.iter().map(|p| p.mentions.len()).sum(),
            themes: posts.iter().map(|p| p.themes.len()).sum(),
        };
        info!(
            account,
            fetched = report.fetched,
            kept = report.kept,
            hashtags = report.hashtags,
            mentions = report.mentions,
            themes = report.themes,
            "Ingest complete"
        );
        Ok(report)
    }
}
