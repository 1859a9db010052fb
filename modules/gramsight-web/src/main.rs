use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, routing::post, Router};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gramsight_common::{Config, TextEmbedder};
use gramsight_graph::{GramsightService, OpenAiEmbedder};

mod routes;
mod templates;

use routes::*;

pub(crate) struct AppState {
    service: GramsightService,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gramsight=info".parse()?))
        .init();

    let config = Config::web_from_env();

    let embedder: Option<Arc<dyn TextEmbedder>> = config.embedding_api_key.as_ref().map(|key| {
        Arc::new(OpenAiEmbedder::new(
            &config.embedding_base_url,
            key,
            &config.embedding_model,
        )) as Arc<dyn TextEmbedder>
    });
    if embedder.is_none() {
        info!("No embedding backend configured — similarity runs in hashtag-overlap mode");
    }

    let state = Arc::new(AppState {
        service: GramsightService::new(&config.data_dir, embedder),
    });

    let app = Router::new()
        // Comparison routes (static segments take precedence over captures)
        .route("/api/compare/context", get(api_comparison_context))
        .route("/api/compare/subgraph", get(api_comparison_subgraph))
        // Per-account API
        .route("/api/{account}/context", get(api_context))
        .route("/api/{account}/engagement", get(api_engagement))
        .route("/api/{account}/hashtags", get(api_hashtags))
        .route("/api/{account}/monthly", get(api_monthly))
        .route("/api/{account}/similar/{post_id}", get(api_similar))
        .route("/api/{account}/subgraph", get(api_subgraph))
        .route("/api/{account}/graph/rebuild", post(api_rebuild_graph))
        // HTML views
        .route("/graph/compare", get(comparison_graph_page))
        .route("/graph/{account}", get(graph_page))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Gramsight web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
