use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::ApiJson;
use super::{ApiError, ApiResponse, AppState, UserCreatedResponse};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserCreatedResponse>>), ApiError> {
    let user_id = state
        .user_service()
        .register(&payload.name, &payload.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserCreatedResponse {
            message: "User created successfully".to_string(),
            user_id,
        })),
    ))
}
