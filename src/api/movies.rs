use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::extract::ApiPath;
use super::validation::validate_tmdb_id;
use super::{ApiError, ApiResponse, AppState};
use crate::clients::tmdb::Genre;
use crate::services::{CatalogService, MovieSummary};

#[derive(Serialize)]
pub struct GenresResponse {
    pub genres: Vec<Genre>,
}

/// GET /api/movie/{id}
pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<MovieSummary>>, ApiError> {
    let id = validate_tmdb_id(id)?;

    let summary = state.catalog().movie(id).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound("Movie not found in TMDB".to_string())
        } else {
            ApiError::from(e)
        }
    })?;

    Ok(Json(ApiResponse::success(summary)))
}

/// GET /api/genres
pub async fn genres() -> Json<ApiResponse<GenresResponse>> {
    Json(ApiResponse::success(GenresResponse {
        genres: CatalogService::genres(),
    }))
}
