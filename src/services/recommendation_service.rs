//! Domain service for the recommendation curation workflow.
//!
//! Adding a movie fetches its metadata upstream, shapes it into a record and
//! inserts it; the storage unique constraint on the movie id is the only
//! duplicate check.

use serde::Serialize;
use thiserror::Error;

use crate::db::Recommendation;
use crate::domain::{MovieId, RecommendationId};

/// Failures of the curation workflow. The display strings are the messages
/// shown to admins.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("Movie not found in TMDB")]
    MovieNotFound { movie_id: MovieId, reason: String },

    #[error("Movie already exists in recommendations")]
    AlreadyExists(MovieId),

    #[error("Recommendation not found")]
    NotFound(RecommendationId),

    #[error("Error {action} recommendation: {cause}")]
    Unexpected { action: &'static str, cause: String },
}

impl CurationError {
    pub(crate) fn adding(cause: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            action: "adding",
            cause: format!("{cause:#}"),
        }
    }

    pub(crate) fn deleting(cause: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            action: "deleting",
            cause: format!("{cause:#}"),
        }
    }
}

/// Optional admin-supplied fields for a new recommendation.
#[derive(Debug, Clone, Default)]
pub struct AddMovieRequest {
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurationOutcome {
    pub recommendation_id: RecommendationId,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users: u64,
    pub recommendations: u64,
    pub active_recommendations: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_recommendations: Vec<Recommendation>,
}

/// Domain service trait for curating recommendations.
#[async_trait::async_trait]
pub trait RecommendationService: Send + Sync {
    /// Fetches `movie_id` upstream and stores it as a new recommendation.
    ///
    /// # Errors
    ///
    /// - [`CurationError::MovieNotFound`] when the upstream call fails for any reason
    /// - [`CurationError::AlreadyExists`] when the movie is already curated
    /// - [`CurationError::Unexpected`] on storage faults
    async fn add_movie(
        &self,
        movie_id: MovieId,
        request: AddMovieRequest,
    ) -> Result<CurationOutcome, CurationError>;

    /// Deletes a recommendation after confirming it exists.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::NotFound`] for an unknown id; nothing is
    /// written in that case.
    async fn delete_movie(&self, id: RecommendationId) -> Result<CurationOutcome, CurationError>;

    /// Active recommendations, newest first.
    async fn list_active(&self) -> Result<Vec<Recommendation>, CurationError>;

    async fn dashboard(&self) -> Result<Dashboard, CurationError>;
}
