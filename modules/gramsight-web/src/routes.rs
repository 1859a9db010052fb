//! HTTP handlers. Each one calls the core surface, maps precondition
//! failures to client-facing 4xx JSON, and keeps real faults as 500s.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use gramsight_common::{GramsightError, MediaType};
use gramsight_graph::SubgraphFilters;

use crate::templates::render_graph_view;
use crate::AppState;

fn error_response(e: GramsightError) -> Response {
    let status = match &e {
        GramsightError::NotEnoughAccounts(_) => StatusCode::BAD_REQUEST,
        _ if e.is_precondition() => StatusCode::NOT_FOUND,
        _ => {
            warn!(error = %e, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

fn json_or_error<T: serde::Serialize>(result: Result<T, GramsightError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Query parameter shapes ---

#[derive(Debug, Deserialize)]
pub(crate) struct FilterQuery {
    month: Option<String>,
    media_type: Option<String>,
    min_likes: Option<u64>,
    /// Comma-separated handles, comparison routes only.
    accounts: Option<String>,
}

impl FilterQuery {
    fn filters(&self) -> Result<SubgraphFilters, Response> {
        let media_type = match self.media_type.as_deref() {
            None => None,
            Some(raw) => match MediaType::parse(raw) {
                Some(mt) => Some(mt),
                None => {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": format!("unknown media_type {raw:?} (expected image, video, or carousel)")
                        })),
                    )
                        .into_response())
                }
            },
        };
        Ok(SubgraphFilters {
            month: self.month.clone(),
            media_type,
            min_likes: self.min_likes,
        })
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimilarQuery {
    top_k: Option<usize>,
}

// --- Per-account API ---

pub(crate) async fn api_context(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Response {
    json_or_error(state.service.graph_context(&account))
}

pub(crate) async fn api_engagement(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Response {
    json_or_error(state.service.engagement_summary(&account))
}

pub(crate) async fn api_hashtags(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Response {
    json_or_error(state.service.hashtag_analysis(&account))
}

pub(crate) async fn api_monthly(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Response {
    json_or_error(state.service.monthly_breakdown(&account))
}

pub(crate) async fn api_similar(
    State(state): State<Arc<AppState>>,
    Path((account, post_id)): Path<(String, String)>,
    Query(params): Query<SimilarQuery>,
) -> Response {
    let top_k = params.top_k.unwrap_or(5);
    json_or_error(state.service.find_similar(&account, &post_id, top_k).await)
}

pub(crate) async fn api_subgraph(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
    Query(params): Query<FilterQuery>,
) -> Response {
    let filters = match params.filters() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    json_or_error(state.service.extract_subgraph(&account, &filters))
}

pub(crate) async fn api_rebuild_graph(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Response {
    json_or_error(state.service.build_graph(&account, true).map(|graph| {
        json!({
            "account": account,
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
        })
    }))
}

// --- Comparison API ---

pub(crate) async fn api_comparison_context(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Response {
    json_or_error(state.service.comparison_context(&params.accounts()))
}

pub(crate) async fn api_comparison_subgraph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Response {
    let filters = match params.filters() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    json_or_error(
        state
            .service
            .extract_comparison_subgraph(&params.accounts(), &filters),
    )
}

// --- HTML views ---

pub(crate) async fn graph_page(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
    Query(params): Query<FilterQuery>,
) -> Response {
    let filters = match params.filters() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match state.service.extract_subgraph(&account, &filters) {
        Ok(subgraph) => {
            let title = format!("{account} — Instagram Knowledge Graph");
            Html(render_graph_view(&title, &subgraph)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub(crate) async fn comparison_graph_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Response {
    let accounts = params.accounts();
    let filters = match params.filters() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match state.service.extract_comparison_subgraph(&accounts, &filters) {
        Ok(subgraph) => {
            let title = format!("{} — Comparison Graph", accounts.join(" vs "));
            Html(render_graph_view(&title, &subgraph)).into_response()
        }
        Err(e) => error_response(e),
    }
}
