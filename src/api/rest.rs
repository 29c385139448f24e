use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::query::{DEFAULT_AGE_DAYS, DEFAULT_LIMIT, DEFAULT_PAGES};
use crate::models::{ParamError, QueryView, TokenQuery};
use crate::services::{ResultCache, TokenPipeline};

pub struct AppState {
    pub pipeline: Arc<TokenPipeline>,
    pub cache: Arc<ResultCache>,
}

/// Raw query string of GET /api/tokens; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct TokensParams {
    pub view: Option<String>,
    pub pages: Option<u32>,
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

impl TokensParams {
    pub fn into_query(self) -> Result<TokenQuery, ParamError> {
        let view = match self.view.as_deref() {
            Some(raw) => raw.parse::<QueryView>()?,
            None => QueryView::Volume,
        };
        TokenQuery::new(
            view,
            self.pages.unwrap_or(DEFAULT_PAGES),
            self.days.unwrap_or(DEFAULT_AGE_DAYS),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }
}

/// GET /api/tokens - the merged token list
async fn get_tokens(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TokensParams>,
) -> Response {
    match params.into_query() {
        Ok(query) => Json(state.pipeline.get_tokens(&query).await).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// GET /health - liveness plus cache occupancy
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "cache_entries": state.cache.len(),
    }))
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tokens", get(get_tokens))
        .route("/health", get(health))
        .with_state(state)
}
