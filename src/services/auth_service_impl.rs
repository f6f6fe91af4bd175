//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::constants::limits::MIN_PASSWORD_LEN;
use crate::db::{InsertOutcome, Store, verify_password};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        let identity = self
            .store
            .verify_admin_credentials(username, password, &self.security)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let must_change_password = self.must_change_password(identity.id).await?;

        Ok(LoginResult {
            admin: identity,
            must_change_password,
        })
    }

    async fn create_admin(&self, username: &str, password: &str) -> Result<i32, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        match self
            .store
            .create_admin(username, password, &self.security)
            .await?
        {
            InsertOutcome::Created(id) => Ok(id),
            InsertOutcome::Duplicate => Err(AuthError::DuplicateUsername(username.to_string())),
        }
    }

    async fn change_password(
        &self,
        admin_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "New password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let account = self
            .store
            .get_admin(admin_id)
            .await?
            .ok_or(AuthError::AdminNotFound)?;

        if !verify_password(account.password_hash, current_password.to_string()).await? {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_admin_password(admin_id, new_password, &self.security)
            .await?;

        tracing::info!(admin = %account.username, "Admin password changed");
        Ok(())
    }

    async fn must_change_password(&self, admin_id: i32) -> Result<bool, AuthError> {
        let account = self
            .store
            .get_admin(admin_id)
            .await?
            .ok_or(AuthError::AdminNotFound)?;
        Ok(account.must_change_password)
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

    async fn seeded_service() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.bootstrap_admin(&fast_security()).await.unwrap();
        SeaOrmAuthService::new(store, fast_security())
    }

    #[tokio::test]
    async fn default_admin_authenticates_and_is_flagged() {
        let service = seeded_service().await;

        let result = service.authenticate("admin", "admin123").await.unwrap();
        assert_eq!(result.admin.username, "admin");
        assert_eq!(result.admin.id, 1);
        assert!(result.must_change_password);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let service = seeded_service().await;

        let wrong_password = service.authenticate("admin", "wrong-password").await;
        let unknown_user = service.authenticate("ghost", "admin123").await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn create_admin_rejects_duplicates() {
        let service = seeded_service().await;

        let id = service.create_admin("editor", "long-enough").await.unwrap();
        assert!(id > 1);

        let again = service.create_admin("editor", "another-one").await;
        assert!(matches!(again, Err(AuthError::DuplicateUsername(name)) if name == "editor"));
    }

    #[tokio::test]
    async fn change_password_rotates_and_clears_flag() {
        let service = seeded_service().await;

        let short = service.change_password(1, "admin123", "short").await;
        assert!(matches!(short, Err(AuthError::Validation(_))));

        let wrong = service.change_password(1, "nope", "brand-new-pass").await;
        assert!(matches!(wrong, Err(AuthError::Validation(_))));

        service
            .change_password(1, "admin123", "brand-new-pass")
            .await
            .unwrap();

        assert!(!service.must_change_password(1).await.unwrap());
        assert!(service.authenticate("admin", "admin123").await.is_err());
        assert!(service.authenticate("admin", "brand-new-pass").await.is_ok());
    }
}
