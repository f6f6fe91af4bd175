//! TMDB (The Movie Database) v3 client.
//!
//! Every call attaches the configured API key and returns a tagged result:
//! transport failures, non-success statuses and undecodable bodies all come
//! back as [`UpstreamError`]. Nothing is retried.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::TmdbConfig;
use crate::constants::tmdb::DETAILS_APPEND;
use crate::domain::{MovieId, Page};

#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("TMDB API key is not configured")]
    MissingApiKey,

    #[error("TMDB request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("TMDB returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to parse TMDB response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl UpstreamError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<Value>,
    #[serde(default)]
    pub crew: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultList {
    #[serde(default)]
    pub results: Vec<Value>,
}

/// `movie/{id}` with credits, videos and similar titles appended.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieDetails {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub status: Option<String>,
    pub credits: Option<Credits>,
    pub videos: Option<ResultList>,
    pub similar: Option<ResultList>,
}

/// Source of upstream movie metadata.
///
/// Listing calls return the provider's JSON page untouched; details are typed
/// because the curation workflow reads fields out of them.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn movie_details(&self, id: MovieId) -> Result<MovieDetails, UpstreamError>;

    async fn trending(&self, page: Page) -> Result<Value, UpstreamError>;

    async fn popular(&self, page: Page) -> Result<Value, UpstreamError>;

    async fn top_rated(&self, page: Page) -> Result<Value, UpstreamError>;

    async fn upcoming(&self, page: Page) -> Result<Value, UpstreamError>;

    async fn now_playing(&self, page: Page) -> Result<Value, UpstreamError>;

    async fn search(&self, query: &str, page: Page) -> Result<Value, UpstreamError>;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    language: Option<String>,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("TMDB_API_KEY is not set; metadata requests will fail");
        }

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        label: &'static str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let result = self.fetch(endpoint, params).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("tmdb_requests_total", "endpoint" => label, "outcome" => outcome)
            .increment(1);

        if let Err(e) = &result {
            tracing::warn!(endpoint = label, error = %e, "TMDB API error");
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 2);
        query.push(("api_key", api_key.to_string()));
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }
        query.extend(params.iter().cloned());

        // The request URL carries the API key, so errors are rendered without it.
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                endpoint: endpoint.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| UpstreamError::Decode {
            endpoint: endpoint.to_string(),
            message: e.without_url().to_string(),
        })
    }

    async fn listing(
        &self,
        endpoint: &str,
        label: &'static str,
        page: Page,
    ) -> Result<Value, UpstreamError> {
        self.get(endpoint, label, &[("page", page.value().to_string())])
            .await
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn movie_details(&self, id: MovieId) -> Result<MovieDetails, UpstreamError> {
        tracing::debug!(movie_id = %id, "Fetching TMDB movie details");

        self.get(
            &format!("movie/{id}"),
            "movie_details",
            &[("append_to_response", DETAILS_APPEND.to_string())],
        )
        .await
    }

    async fn trending(&self, page: Page) -> Result<Value, UpstreamError> {
        self.listing("trending/movie/week", "trending", page).await
    }

    async fn popular(&self, page: Page) -> Result<Value, UpstreamError> {
        self.listing("movie/popular", "popular", page).await
    }

    async fn top_rated(&self, page: Page) -> Result<Value, UpstreamError> {
        self.listing("movie/top_rated", "top_rated", page).await
    }

    async fn upcoming(&self, page: Page) -> Result<Value, UpstreamError> {
        self.listing("movie/upcoming", "upcoming", page).await
    }

    async fn now_playing(&self, page: Page) -> Result<Value, UpstreamError> {
        self.listing("movie/now_playing", "now_playing", page).await
    }

    async fn search(&self, query: &str, page: Page) -> Result<Value, UpstreamError> {
        tracing::debug!(query = %query, page = page.value(), "Searching TMDB movies");

        self.get(
            "search/movie",
            "search",
            &[
                ("query", query.to_string()),
                ("page", page.value().to_string()),
                ("include_adult", "false".to_string()),
            ],
        )
        .await
    }
}
