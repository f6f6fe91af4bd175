use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{optional_text, validate_movie_id, validate_recommendation_id};
use super::{ApiError, ApiResponse, AppState, CurationResponse, RecommendationsResponse};
use crate::db::Recommendation;
use crate::services::{AddMovieRequest, Dashboard, UserList};

#[derive(Deserialize)]
pub struct AddMovieBody {
    /// Number or numeric string.
    pub movie_id: Option<Value>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state.recommendation_service().dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// GET /admin/recommendations
pub async fn list_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<RecommendationsResponse<Recommendation>>>, ApiError> {
    let recommendations = state.recommendation_service().list_active().await?;

    Ok(Json(ApiResponse::success(RecommendationsResponse {
        count: recommendations.len(),
        recommendations,
    })))
}

/// POST /admin/add
pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AddMovieBody>,
) -> Result<Json<ApiResponse<CurationResponse>>, ApiError> {
    let movie_id = validate_movie_id(payload.movie_id.as_ref())?;
    let request = AddMovieRequest {
        description: optional_text(payload.description, "Description", 2000)?,
        category: optional_text(payload.category, "Category", 50)?,
    };

    let outcome = state
        .recommendation_service()
        .add_movie(movie_id, request)
        .await?;

    Ok(Json(ApiResponse::success(CurationResponse {
        message: outcome.message,
        recommendation_id: outcome.recommendation_id.value(),
    })))
}

/// DELETE /admin/delete/{id}
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<CurationResponse>>, ApiError> {
    let id = validate_recommendation_id(id)?;
    let outcome = state.recommendation_service().delete_movie(id).await?;

    Ok(Json(ApiResponse::success(CurationResponse {
        message: outcome.message,
        recommendation_id: outcome.recommendation_id.value(),
    })))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<UserList>>, ApiError> {
    let users = state.user_service().list().await?;
    Ok(Json(ApiResponse::success(users)))
}
