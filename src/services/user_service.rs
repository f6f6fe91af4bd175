//! Minimal user registry: insert and list, unique by email.

use serde::Serialize;
use thiserror::Error;

use crate::db::{InsertOutcome, Store, User};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registers a user. Name and email are trimmed; the email is lowercased.
    pub async fn register(&self, name: &str, email: &str) -> Result<i32, UserError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() {
            return Err(UserError::Validation("Name is required".to_string()));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(UserError::Validation(
                "A valid email address is required".to_string(),
            ));
        }

        match self.store.create_user(name, &email).await? {
            InsertOutcome::Created(id) => {
                tracing::info!(user_id = id, "User registered");
                Ok(id)
            }
            InsertOutcome::Duplicate => Err(UserError::DuplicateEmail),
        }
    }

    pub async fn list(&self) -> Result<UserList, UserError> {
        let users = self.store.list_users().await?;
        Ok(UserList {
            count: users.len(),
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> UserService {
        UserService::new(Store::new("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn register_validates_input() {
        let service = service().await;

        assert!(matches!(
            service.register("  ", "a@b.c").await,
            Err(UserError::Validation(_))
        ));
        assert!(matches!(
            service.register("Ada", "not-an-email").await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let service = service().await;

        service.register("Ada", "ada@example.com").await.unwrap();
        let err = service
            .register("Ada L.", " ADA@example.com ")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::DuplicateEmail));
        assert_eq!(err.to_string(), "Email already registered");

        let list = service.list().await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.users[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn register_stores_normalized_fields() {
        let service = service().await;

        let id = service
            .register("  Grace Hopper ", "Grace@Example.COM")
            .await
            .unwrap();

        let stored = service
            .store
            .get_user_by_email("grace@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.name, "Grace Hopper");
    }
}
