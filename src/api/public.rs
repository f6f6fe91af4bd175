use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::extract::ApiQuery;
use super::validation::{validate_page, validate_search_query};
use super::{ApiError, ApiResponse, AppState, HealthResponse, IndexResponse, ResultsResponse};
use crate::db::Recommendation;
use crate::services::BrowseKind;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
}

/// GET /
pub async fn index() -> Json<ApiResponse<IndexResponse>> {
    let endpoints = BTreeMap::from([
        ("trending", "/trending"),
        ("search", "/search?query=..."),
        ("popular", "/popular"),
        ("top_rated", "/top-rated"),
        ("upcoming", "/upcoming"),
        ("now_playing", "/now-playing"),
        ("recommendations", "/recommendations"),
        ("movie", "/api/movie/{id}"),
        ("genres", "/api/genres"),
    ]);

    Json(ApiResponse::success(IndexResponse {
        message: "Marquee Movie API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    }))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
    };

    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

async fn browse(
    state: &AppState,
    kind: BrowseKind,
    query: PageQuery,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let page = validate_page(query.page)?;
    let data = state.catalog().browse(kind, page).await?;
    Ok(Json(ApiResponse::success(data)))
}

/// GET /trending
pub async fn trending(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    browse(&state, BrowseKind::Trending, query).await
}

/// GET /popular
pub async fn popular(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    browse(&state, BrowseKind::Popular, query).await
}

/// GET /top-rated
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    browse(&state, BrowseKind::TopRated, query).await
}

/// GET /upcoming
pub async fn upcoming(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    browse(&state, BrowseKind::Upcoming, query).await
}

/// GET /now-playing
pub async fn now_playing(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    browse(&state, BrowseKind::NowPlaying, query).await
}

/// GET /search
pub async fn search(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let query = validate_search_query(params.query.as_deref())?;
    let page = validate_page(params.page)?;

    let data = state.catalog().search(query, page).await?;
    Ok(Json(ApiResponse::success(data)))
}

/// GET /recommendations
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ResultsResponse<Recommendation>>>, ApiError> {
    let list = state.recommendation_service().list_active().await?;
    Ok(Json(ApiResponse::success(list.into())))
}
