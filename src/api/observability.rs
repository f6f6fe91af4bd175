//! Request telemetry: one span and one wide event per request, HTTP metrics
//! labelled by API area and failure class, and response hardening headers.

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::error::FailureKind;
use super::{ApiError, AppState};

/// Coarse grouping of routes used as a low-cardinality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiArea {
    /// Pass-through to TMDB.
    Tmdb,
    Recommendations,
    Curation,
    Auth,
    Registry,
    Ops,
    Unmatched,
}

impl ApiArea {
    fn classify(path: &str) -> Self {
        match path {
            "/" | "/health" | "/admin/metrics" => Self::Ops,
            "/recommendations" => Self::Recommendations,
            "/users" | "/admin/users" => Self::Registry,
            "/admin/login" | "/admin/logout" | "/admin/check-auth" | "/admin/password" => {
                Self::Auth
            }
            p if p.starts_with("/admin/") => Self::Curation,
            _ => Self::Tmdb,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Tmdb => "tmdb",
            Self::Recommendations => "recommendations",
            Self::Curation => "curation",
            Self::Auth => "auth",
            Self::Registry => "registry",
            Self::Ops => "ops",
            Self::Unmatched => "unmatched",
        }
    }
}

/// GET /admin/metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .prometheus_handle
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();

    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());
    let area = if route.is_some() {
        ApiArea::classify(req.uri().path())
    } else {
        ApiArea::Unmatched
    };
    let method = req.method().clone();

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %req.uri().path(),
        area = area.as_str(),
        admin = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let status = response.status().as_u16();
        let failure = response.extensions().get::<FailureKind>().copied();
        let outcome = failure.map_or("ok", FailureKind::as_str);
        let elapsed = started.elapsed();

        let labels = [
            ("method", method.to_string()),
            ("route", route.unwrap_or_else(|| "unmatched".to_string())),
            ("area", area.as_str().to_string()),
            ("outcome", outcome.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match failure {
            Some(FailureKind::Unexpected | FailureKind::Upstream) => warn!(
                event = "http_request_finished",
                status_code = status,
                outcome,
                duration_ms,
                "Request failed"
            ),
            _ => info!(
                event = "http_request_finished",
                status_code = status,
                outcome,
                duration_ms,
                "Request finished"
            ),
        }

        response
    }
    .instrument(span)
    .await
}

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "content-security-policy",
        "default-src 'self'; img-src 'self' data: https://image.tmdb.org; frame-src https://www.youtube.com; frame-ancestors 'none'; base-uri 'self'",
    ),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_fall_into_their_area() {
        assert_eq!(ApiArea::classify("/trending"), ApiArea::Tmdb);
        assert_eq!(ApiArea::classify("/api/movie/550"), ApiArea::Tmdb);
        assert_eq!(ApiArea::classify("/recommendations"), ApiArea::Recommendations);
        assert_eq!(ApiArea::classify("/admin/recommendations"), ApiArea::Curation);
        assert_eq!(ApiArea::classify("/admin/delete/4"), ApiArea::Curation);
        assert_eq!(ApiArea::classify("/admin/check-auth"), ApiArea::Auth);
        assert_eq!(ApiArea::classify("/admin/users"), ApiArea::Registry);
        assert_eq!(ApiArea::classify("/health"), ApiArea::Ops);
    }
}
