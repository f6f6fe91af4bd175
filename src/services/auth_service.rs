//! Domain service for admin authentication and account management.
//!
//! Credential checks never report whether the username or the password was
//! wrong; both surface as [`AuthError::InvalidCredentials`].

use serde::Serialize;
use thiserror::Error;

use crate::domain::AdminIdentity;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Admin not found")]
    AdminNotFound,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<tower_sessions::session::Error> for AuthError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

/// Successful credential check.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub admin: AdminIdentity,
    pub must_change_password: bool,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials against the admin store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username and
    /// for a wrong password alike.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<LoginResult, AuthError>;

    /// Creates an admin account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] when the name is taken.
    async fn create_admin(&self, username: &str, password: &str) -> Result<i32, AuthError>;

    /// Changes an admin's password after re-checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or
    /// the new one is too short or unchanged.
    async fn change_password(
        &self,
        admin_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Whether the account still carries the bootstrap rotation flag.
    async fn must_change_password(&self, admin_id: i32) -> Result<bool, AuthError>;
}
