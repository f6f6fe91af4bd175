//! Per-request admin session state.
//!
//! The session itself lives in whichever `tower_sessions` store the router was
//! built with; this type only reads and writes the admin marker inside it.

use serde::Serialize;
use tower_sessions::Session;

use crate::constants::session::ADMIN_KEY;
use crate::domain::AdminIdentity;
use crate::services::auth_service::AuthError;

/// Authentication state carried by one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    Authenticated(AdminIdentity),
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn into_admin(self) -> Option<AdminIdentity> {
        match self {
            Self::Authenticated(admin) => Some(admin),
            Self::Anonymous => None,
        }
    }
}

/// Admin view over a `tower_sessions::Session`.
#[derive(Clone)]
pub struct AdminSession {
    session: Session,
}

impl AdminSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Binds `admin` to the session under a fresh session id.
    pub async fn login(&self, admin: &AdminIdentity) -> Result<(), AuthError> {
        self.session.cycle_id().await?;
        self.session.insert(ADMIN_KEY, admin).await?;
        Ok(())
    }

    /// Drops all session data. Safe to call on an anonymous session.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.session.flush().await?;
        Ok(())
    }

    pub async fn state(&self) -> Result<AuthState, AuthError> {
        let admin = self.session.get::<AdminIdentity>(ADMIN_KEY).await?;
        Ok(admin.map_or(AuthState::Anonymous, AuthState::Authenticated))
    }

    pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.state().await?.is_authenticated())
    }

    pub async fn current_admin(&self) -> Result<Option<AdminIdentity>, AuthError> {
        Ok(self.state().await?.into_admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn fresh_session() -> AdminSession {
        let store = Arc::new(MemoryStore::default());
        AdminSession::new(Session::new(None, store, None))
    }

    fn admin() -> AdminIdentity {
        AdminIdentity {
            id: 1,
            username: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn new_session_is_anonymous() {
        let session = fresh_session();
        assert_eq!(session.state().await.unwrap(), AuthState::Anonymous);
        assert!(session.current_admin().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_binds_identity() {
        let session = fresh_session();
        session.login(&admin()).await.unwrap();

        assert!(session.is_authenticated().await.unwrap());
        assert_eq!(session.current_admin().await.unwrap(), Some(admin()));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let session = fresh_session();

        session.logout().await.unwrap();
        assert!(!session.is_authenticated().await.unwrap());

        session.login(&admin()).await.unwrap();
        session.logout().await.unwrap();
        session.logout().await.unwrap();
        assert_eq!(session.state().await.unwrap(), AuthState::Anonymous);
    }
}
