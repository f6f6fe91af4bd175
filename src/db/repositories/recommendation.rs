use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;

use crate::db::{InsertOutcome, is_unique_violation, now_timestamp};
use crate::domain::{MovieId, RecommendationId};
use crate::entities::{prelude::*, recommendations};

/// A curated movie as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub movie_id: MovieId,
    pub movie_title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<recommendations::Model> for Recommendation {
    fn from(model: recommendations::Model) -> Self {
        Self {
            id: RecommendationId::new(model.id),
            movie_id: MovieId::new(model.movie_id),
            movie_title: model.movie_title,
            description: model.description,
            image_url: model.image_url,
            category: model.category,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// Fields supplied by the curation service; id, flag and timestamp are
/// assigned here.
#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
}

pub struct RecommendationRepository {
    conn: DatabaseConnection,
}

impl RecommendationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active records, newest first; equal timestamps fall back to the later
    /// insert first.
    pub async fn list_active(&self) -> Result<Vec<Recommendation>> {
        let rows = Recommendations::find()
            .filter(recommendations::Column::IsActive.eq(true))
            .order_by_desc(recommendations::Column::CreatedAt)
            .order_by_desc(recommendations::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list active recommendations")?;

        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    pub async fn list_recent_active(&self, limit: u64) -> Result<Vec<Recommendation>> {
        let rows = Recommendations::find()
            .filter(recommendations::Column::IsActive.eq(true))
            .order_by_desc(recommendations::Column::CreatedAt)
            .order_by_desc(recommendations::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent recommendations")?;

        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    pub async fn get(&self, id: RecommendationId) -> Result<Option<Recommendation>> {
        let row = Recommendations::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query recommendation")?;

        Ok(row.map(Recommendation::from))
    }

    #[cfg(test)]
    pub async fn get_by_movie_id(&self, movie_id: MovieId) -> Result<Option<Recommendation>> {
        let row = Recommendations::find()
            .filter(recommendations::Column::MovieId.eq(movie_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query recommendation by movie")?;

        Ok(row.map(Recommendation::from))
    }

    pub async fn insert(&self, new: NewRecommendation) -> Result<InsertOutcome<RecommendationId>> {
        let movie_id = new.movie_id;
        let active_model = recommendations::ActiveModel {
            movie_id: Set(movie_id.value()),
            movie_title: Set(new.title),
            description: Set(Some(new.description)),
            image_url: Set(Some(new.image_url)),
            category: Set(Some(new.category)),
            is_active: Set(true),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        match Recommendations::insert(active_model).exec(&self.conn).await {
            Ok(res) => {
                info!("Added recommendation {} for movie {}", res.last_insert_id, movie_id);
                Ok(InsertOutcome::Created(RecommendationId::new(res.last_insert_id)))
            }
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Duplicate),
            Err(err) => Err(err).context("Failed to insert recommendation"),
        }
    }

    /// Deleting a missing id is not an error here.
    pub async fn delete(&self, id: RecommendationId) -> Result<()> {
        Recommendations::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete recommendation")?;
        Ok(())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Recommendations::find()
            .count(&self.conn)
            .await
            .context("Failed to count recommendations")
    }

    pub async fn count_active(&self) -> Result<u64> {
        Recommendations::find()
            .filter(recommendations::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active recommendations")
    }

    #[cfg(test)]
    async fn set_active(&self, id: RecommendationId, active: bool) -> Result<()> {
        use sea_orm::ActiveModelTrait;

        let row = Recommendations::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Recommendation not found: {id}"))?;
        let mut model: recommendations::ActiveModel = row.into();
        model.is_active = Set(active);
        model.update(&self.conn).await?;
        Ok(())
    }
}
