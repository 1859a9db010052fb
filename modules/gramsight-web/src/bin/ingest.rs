//! Ingest CLI: scrape an account's recent posts, normalize them, and build
//! (or rebuild) its knowledge graph.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use apify_client::ApifyClient;
use gramsight_common::Config;
use gramsight_graph::{GramsightService, PostStore};
use gramsight_ingest::IngestPipeline;

#[derive(Parser)]
#[command(name = "ingest", about = "Scrape an Instagram account and build its knowledge graph")]
struct Args {
    /// Instagram handle to ingest (without @).
    account: String,

    /// Maximum number of posts to request from the scraper.
    #[arg(long, default_value_t = 200)]
    limit: u32,

    /// Only keep posts newer than this many days.
    #[arg(long, default_value_t = 60)]
    days_back: i64,

    /// Skip scraping and only rebuild the graph from existing data.
    #[arg(long)]
    rebuild_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gramsight=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    if !args.rebuild_only {
        let client = ApifyClient::new(config.apify_api_token.clone());
        let store = PostStore::new(&config.data_dir);
        let pipeline = IngestPipeline::new(client, store);
        let report = pipeline
            .run(&args.account, args.limit, args.days_back)
            .await?;
        info!(
            account = %report.account,
            kept = report.kept,
            hashtags = report.hashtags,
            mentions = report.mentions,
            themes = report.themes,
            "Ingestion finished"
        );
    }

    let service = GramsightService::new(&config.data_dir, None);
    let graph = service.build_graph(&args.account, true)?;
    info!(
        account = %args.account,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Graph ready — start the web server to explore it"
    );

    Ok(())
}
