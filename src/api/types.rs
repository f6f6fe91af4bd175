use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public recommendation listing.
#[derive(Debug, Serialize)]
pub struct ResultsResponse<T> {
    pub results: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ResultsResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Admin recommendation listing.
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse<T> {
    pub recommendations: Vec<T>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CurationResponse {
    pub message: String,
    pub recommendation_id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: std::collections::BTreeMap<&'static str, &'static str>,
}
