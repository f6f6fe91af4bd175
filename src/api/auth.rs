use axum::{
    Extension, Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_sessions::Session;

use super::extract::ApiJson;
use super::error::FailureKind;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::constants::session::LOGIN_PAGE;
use crate::domain::AdminIdentity;
use crate::services::{AdminSession, AuthState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
    pub must_change_password: bool,
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<bool>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl<S: Send + Sync> FromRequestParts<S> for AdminSession {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state)
            .await
            .map(Self::new)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Access guard for admin routes.
///
/// Anonymous requests never reach the handler: browsers asking for HTML are
/// sent to the login page, everything else gets a 401 JSON body.
pub async fn require_admin(
    session: AdminSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match session.state().await? {
        AuthState::Authenticated(admin) => {
            tracing::Span::current().record("admin", admin.username.as_str());
            request.extensions_mut().insert(admin);
            Ok(next.run(request).await)
        }
        AuthState::Anonymous => {
            if wants_html(&request) {
                let mut response = Redirect::to(LOGIN_PAGE).into_response();
                response.extensions_mut().insert(FailureKind::Unauthenticated);
                Ok(response)
            } else {
                Err(ApiError::unauthorized())
            }
        }
    }
}

fn wants_html(request: &Request) -> bool {
    request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

// ============================================================================
// Handlers
// ============================================================================

const BUILTIN_LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Marquee admin</title></head>
<body>
<h1>Marquee admin</h1>
<p>No frontend bundle is installed. Sign in by sending
<code>{"username": "...", "password": "..."}</code> as JSON to
<code>POST /admin/login</code>.</p>
</body>
</html>
"#;

/// GET /admin/login-page
///
/// Serves `login.html` from the frontend bundle when one is installed.
pub async fn login_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let page = Path::new(&state.config().general.static_path).join("login.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => Html(html),
        Err(_) => Html(BUILTIN_LOGIN_PAGE.to_string()),
    }
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password required"));
    }

    let result = state
        .auth_service()
        .authenticate(payload.username.trim(), &payload.password)
        .await
        .inspect_err(|_| tracing::warn!(username = %payload.username.trim(), "Failed admin login"))?;

    session.login(&result.admin).await?;
    tracing::info!(admin = %result.admin.username, "Admin logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        message: "Login successful".to_string(),
        username: result.admin.username,
        must_change_password: result.must_change_password,
    })))
}

/// POST /admin/logout
pub async fn logout(
    session: AdminSession,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session.logout().await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logout successful",
    ))))
}

/// GET /admin/check-auth
pub async fn check_auth(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Result<Json<ApiResponse<AuthStatusResponse>>, ApiError> {
    let response = match session.current_admin().await? {
        Some(admin) => {
            let must_change_password = state
                .auth_service()
                .must_change_password(admin.id)
                .await
                .ok();
            AuthStatusResponse {
                authenticated: true,
                username: Some(admin.username),
                must_change_password,
            }
        }
        None => AuthStatusResponse {
            authenticated: false,
            username: None,
            must_change_password: None,
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

/// PUT /admin/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(admin.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}
