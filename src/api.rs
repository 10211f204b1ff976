//! HTTP routes
//!
//! `GET /api/search/{site}/{query}[/{category}[/{page}]]`
//! `GET /api/trending/{site}[/{section}[/{category}]]`
//!
//! Successful scrapes (including soft pagination errors) answer 200; any
//! hard failure answers 404 with an `err` message.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::ScrapeError;
use crate::orchestrator::{Orchestrator, SearchOptions, SearchRequest, TrendingRequest};
use crate::scrapers::Section;

/// Shared application state
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Used when a search does not pass `?count=`
    pub count_torrents: bool,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, count_torrents: bool) -> Self {
        Self {
            orchestrator,
            count_torrents,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/search/{site}/{query}", get(search))
        .route("/api/search/{site}/{query}/{category}", get(search))
        .route("/api/search/{site}/{query}/{category}/{page}", get(search))
        .route("/api/trending/{site}", get(trending))
        .route("/api/trending/{site}/{section}", get(trending))
        .route("/api/trending/{site}/{section}/{category}", get(trending))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body of every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub err: String,
    pub status: &'static str,
    pub data: Vec<serde_json::Value>,
}

/// Anything that ends a request with a 404
pub struct ApiError(String);

impl From<ScrapeError> for ApiError {
    fn from(e: ScrapeError) -> Self {
        Self(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "request failed");
        let body = ErrorBody {
            err: self.0,
            status: "error",
            data: Vec::new(),
        };
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub count: Option<bool>,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let site = param(&params, "site")?;
    let mut req = SearchRequest::new(site, param(&params, "query")?);
    if let Some(category) = params.get("category") {
        req = req.category(category);
    }
    if let Some(page) = params.get("page") {
        req = req.page(parse_page(page)?);
    }

    let opts = SearchOptions {
        count_torrents: query.count.unwrap_or(state.count_torrents),
    };
    let resp = state.orchestrator.search(&req, opts).await?;
    Ok(Json(resp).into_response())
}

async fn trending(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut req = TrendingRequest::new(param(&params, "site")?);
    if let Some(section) = params.get("section") {
        req = req.section(section.parse::<Section>()?);
    }
    if let Some(category) = params.get("category") {
        req = req.category(category);
    }

    let resp = state.orchestrator.trending(&req).await?;
    Ok(Json(resp).into_response())
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ApiError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiError(format!("missing `{}`", name)))
}

fn parse_page(raw: &str) -> Result<u32, ApiError> {
    match raw.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError(format!("invalid page `{}`", raw))),
    }
}
