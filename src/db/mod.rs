use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::domain::{AdminIdentity, RecommendationId};
#[cfg(test)]
use crate::domain::MovieId;

pub mod migrator;
pub mod repositories;

pub use repositories::admin::{AdminAccount, verify_password};
pub use repositories::recommendation::{NewRecommendation, Recommendation};
pub use repositories::user::User;

/// Result of an insert guarded by a storage-level unique constraint.
///
/// The constraint is the only duplicate check; nothing reads before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Created(T),
    Duplicate,
}

impl<T> InsertOutcome<T> {
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Timestamp format shared with the column defaults in the initial migration.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    dummy_hash: Arc<OnceCell<String>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            dummy_hash: Arc::new(OnceCell::new()),
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub(crate) fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone(), self.dummy_hash.clone())
    }

    fn recommendation_repo(&self) -> repositories::recommendation::RecommendationRepository {
        repositories::recommendation::RecommendationRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Admin accounts
    // ========================================================================

    /// Seeds exactly one admin when the table is empty.
    ///
    /// Without a configured password the well-known default is used and the
    /// account is flagged for rotation. Returns whether a row was written.
    pub async fn bootstrap_admin(&self, security: &SecurityConfig) -> Result<bool> {
        let repo = self.admin_repo();
        repo.dummy_hash(security).await?;

        if repo.count().await? > 0 {
            return Ok(false);
        }

        let (password, must_change) = match &security.bootstrap_admin_password {
            Some(password) => (password.clone(), false),
            None => {
                if security.production {
                    anyhow::bail!(
                        "Refusing to seed default admin credentials in production; set MARQUEE_ADMIN_PASSWORD"
                    );
                }
                warn!(
                    username = %security.bootstrap_admin_username,
                    "Seeding admin with the default password; change it after first login"
                );
                (crate::constants::bootstrap::ADMIN_PASSWORD.to_string(), true)
            }
        };

        let outcome = repo
            .create(
                &security.bootstrap_admin_username,
                &password,
                must_change,
                Some(security),
            )
            .await?;

        if outcome.is_duplicate() {
            // Another process seeded concurrently.
            return Ok(false);
        }

        info!(
            "Default admin created: username='{}'",
            security.bootstrap_admin_username
        );
        Ok(true)
    }

    pub async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>> {
        self.admin_repo().get_by_username(username).await
    }

    pub async fn get_admin(&self, id: i32) -> Result<Option<AdminAccount>> {
        self.admin_repo().get_by_id(id).await
    }

    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<InsertOutcome<i32>> {
        self.admin_repo()
            .create(username, password, false, Some(security))
            .await
    }

    /// Returns the identity when the credentials match, `None` otherwise.
    pub async fn verify_admin_credentials(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<AdminIdentity>> {
        self.admin_repo()
            .verify_credentials(username, password, security)
            .await
    }

    pub async fn update_admin_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.admin_repo()
            .update_password(id, new_password, security)
            .await
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    pub async fn list_active_recommendations(&self) -> Result<Vec<Recommendation>> {
        self.recommendation_repo().list_active().await
    }

    pub async fn list_recent_recommendations(&self, limit: u64) -> Result<Vec<Recommendation>> {
        self.recommendation_repo().list_recent_active(limit).await
    }

    pub async fn get_recommendation(&self, id: RecommendationId) -> Result<Option<Recommendation>> {
        self.recommendation_repo().get(id).await
    }

    #[cfg(test)]
    pub async fn get_recommendation_by_movie(
        &self,
        movie_id: MovieId,
    ) -> Result<Option<Recommendation>> {
        self.recommendation_repo().get_by_movie_id(movie_id).await
    }

    pub async fn insert_recommendation(
        &self,
        new: NewRecommendation,
    ) -> Result<InsertOutcome<RecommendationId>> {
        self.recommendation_repo().insert(new).await
    }

    pub async fn delete_recommendation(&self, id: RecommendationId) -> Result<()> {
        self.recommendation_repo().delete(id).await
    }

    pub async fn count_recommendations(&self) -> Result<u64> {
        self.recommendation_repo().count_all().await
    }

    pub async fn count_active_recommendations(&self) -> Result<u64> {
        self.recommendation_repo().count_active().await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_user(&self, name: &str, email: &str) -> Result<InsertOutcome<i32>> {
        self.user_repo().create(name, email).await
    }

    #[cfg(test)]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_seeds_default_admin_once() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = fast_security();

        assert!(store.bootstrap_admin(&security).await.unwrap());
        assert!(!store.bootstrap_admin(&security).await.unwrap());

        let admin = store.get_admin_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.id, 1);
        assert!(admin.must_change_password);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn bootstrap_with_override_skips_rotation_flag() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            bootstrap_admin_password: Some("correct horse battery".to_string()),
            ..fast_security()
        };

        store.bootstrap_admin(&security).await.unwrap();

        let admin = store.get_admin_by_username("admin").await.unwrap().unwrap();
        assert!(!admin.must_change_password);
        assert!(
            store
                .verify_admin_credentials("admin", "correct horse battery", &security)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn production_refuses_default_credentials() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            production: true,
            ..fast_security()
        };

        assert!(store.bootstrap_admin(&security).await.is_err());
        assert!(store.get_admin_by_username("admin").await.unwrap().is_none());
    }
}
