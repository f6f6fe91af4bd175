//! `SeaORM` implementation of the `RecommendationService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::clients::{MetadataProvider, tmdb::MovieDetails};
use crate::constants::{DEFAULT_CATEGORY, limits::DASHBOARD_RECENT};
use crate::db::{InsertOutcome, NewRecommendation, Recommendation, Store};
use crate::domain::{MovieId, RecommendationId};
use crate::services::recommendation_service::{
    AddMovieRequest, CurationError, CurationOutcome, Dashboard, DashboardStats,
    RecommendationService,
};

pub struct SeaOrmRecommendationService {
    store: Store,
    metadata: Arc<dyn MetadataProvider>,
    image_base_url: String,
}

impl SeaOrmRecommendationService {
    #[must_use]
    pub fn new(
        store: Store,
        metadata: Arc<dyn MetadataProvider>,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            metadata,
            image_base_url: image_base_url.into(),
        }
    }

    /// Maps upstream metadata onto the stored record shape.
    ///
    /// A missing poster yields the bare CDN prefix rather than an error.
    fn shape(
        &self,
        movie_id: MovieId,
        details: MovieDetails,
        request: AddMovieRequest,
    ) -> NewRecommendation {
        let description = request
            .description
            .filter(|d| !d.trim().is_empty())
            .or(details.overview)
            .unwrap_or_default();

        let category = request
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        NewRecommendation {
            movie_id,
            title: details
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Title".to_string()),
            description,
            image_url: format!(
                "{}{}",
                self.image_base_url,
                details.poster_path.unwrap_or_default()
            ),
            category,
        }
    }
}

#[async_trait]
impl RecommendationService for SeaOrmRecommendationService {
    async fn add_movie(
        &self,
        movie_id: MovieId,
        request: AddMovieRequest,
    ) -> Result<CurationOutcome, CurationError> {
        let details = self.metadata.movie_details(movie_id).await.map_err(|e| {
            warn!(movie_id = %movie_id, error = %e, "Upstream lookup failed while adding recommendation");
            CurationError::MovieNotFound {
                movie_id,
                reason: e.to_string(),
            }
        })?;

        let record = self.shape(movie_id, details, request);
        let title = record.title.clone();

        match self
            .store
            .insert_recommendation(record)
            .await
            .map_err(CurationError::adding)?
        {
            InsertOutcome::Created(id) => {
                metrics::counter!("recommendations_added_total").increment(1);
                info!(recommendation_id = %id, movie_id = %movie_id, title = %title, "Recommendation added");
                Ok(CurationOutcome {
                    recommendation_id: id,
                    message: "Recommendation added successfully".to_string(),
                })
            }
            InsertOutcome::Duplicate => Err(CurationError::AlreadyExists(movie_id)),
        }
    }

    async fn delete_movie(&self, id: RecommendationId) -> Result<CurationOutcome, CurationError> {
        if self
            .store
            .get_recommendation(id)
            .await
            .map_err(CurationError::deleting)?
            .is_none()
        {
            return Err(CurationError::NotFound(id));
        }

        self.store
            .delete_recommendation(id)
            .await
            .map_err(CurationError::deleting)?;

        info!(recommendation_id = %id, "Recommendation deleted");
        Ok(CurationOutcome {
            recommendation_id: id,
            message: "Recommendation deleted successfully".to_string(),
        })
    }

    async fn list_active(&self) -> Result<Vec<Recommendation>, CurationError> {
        self.store
            .list_active_recommendations()
            .await
            .map_err(|e| CurationError::Unexpected {
                action: "listing",
                cause: format!("{e:#}"),
            })
    }

    async fn dashboard(&self) -> Result<Dashboard, CurationError> {
        let failed = |e: anyhow::Error| CurationError::Unexpected {
            action: "summarising",
            cause: format!("{e:#}"),
        };

        let (users, recommendations, active_recommendations, recent) = tokio::try_join!(
            self.store.count_users(),
            self.store.count_recommendations(),
            self.store.count_active_recommendations(),
            self.store.list_recent_recommendations(DASHBOARD_RECENT as u64),
        )
        .map_err(failed)?;

        Ok(Dashboard {
            stats: DashboardStats {
                users,
                recommendations,
                active_recommendations,
            },
            recent_recommendations: recent,
        })
    }
}
