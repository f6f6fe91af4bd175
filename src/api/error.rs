use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::UpstreamError;
use crate::constants::tmdb::SERVICE_NAME;
use crate::services::{AuthError, CurationError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error class stamped into error response extensions; the request logger
/// reports it as the request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Unauthenticated,
    NotFound,
    Duplicate,
    Upstream,
    Unexpected,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::Upstream => "upstream",
            Self::Unexpected => "unexpected",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let kind = self.failure_kind();
        let body = ApiResponse::<()>::error(error_message);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        Self::tmdb_error(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::DuplicateUsername(_) => Self::Conflict(err.to_string()),
            AuthError::AdminNotFound => Self::Unauthorized("Admin account no longer exists".into()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Session(msg) => Self::InternalError(format!("Session error: {msg}")),
            AuthError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<CurationError> for ApiError {
    fn from(err: CurationError) -> Self {
        match err {
            CurationError::MovieNotFound { .. } | CurationError::NotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CurationError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            CurationError::Unexpected { .. } => Self::InternalError(err.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::DuplicateEmail => Self::Conflict(err.to_string()),
            UserError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::ValidationError(_) => FailureKind::Validation,
            Self::Conflict(_) => FailureKind::Duplicate,
            Self::Unauthorized(_) => FailureKind::Unauthenticated,
            Self::ExternalApiError { .. } => FailureKind::Upstream,
            Self::DatabaseError(_) | Self::InternalError(_) => FailureKind::Unexpected,
        }
    }

    pub fn tmdb_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: SERVICE_NAME.to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Authentication required".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MovieId, RecommendationId};

    #[test]
    fn curation_errors_map_to_client_statuses() {
        let not_found: ApiError = CurationError::MovieNotFound {
            movie_id: MovieId::new(1),
            reason: "404".into(),
        }
        .into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let duplicate: ApiError = CurationError::AlreadyExists(MovieId::new(1)).into();
        assert_eq!(duplicate.into_response().status(), StatusCode::CONFLICT);

        let missing: ApiError = CurationError::NotFound(RecommendationId::new(3)).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unexpected_failures_are_opaque() {
        let err: ApiError = CurationError::adding("disk I/O error").into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err: ApiError = UpstreamError::MissingApiKey.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn error_responses_carry_their_failure_kind() {
        let response = ApiError::from(CurationError::AlreadyExists(MovieId::new(550))).into_response();
        assert_eq!(
            response.extensions().get::<FailureKind>(),
            Some(&FailureKind::Duplicate)
        );

        let response = ApiError::tmdb_error("timed out").into_response();
        assert_eq!(
            response.extensions().get::<FailureKind>(),
            Some(&FailureKind::Upstream)
        );

        let response = ApiError::DatabaseError("locked".into()).into_response();
        assert_eq!(
            response.extensions().get::<FailureKind>().map(|k| k.as_str()),
            Some("unexpected")
        );
    }
}
