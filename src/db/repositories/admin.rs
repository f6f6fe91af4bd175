use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::{InsertOutcome, is_unique_violation, now_timestamp};
use crate::domain::AdminIdentity;
use crate::entities::{admin, prelude::*};

/// Admin account as stored, including the password hash.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub must_change_password: bool,
    pub created_at: String,
}

impl From<admin::Model> for AdminAccount {
    fn from(model: admin::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
        }
    }
}

impl AdminAccount {
    #[must_use]
    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

const DUMMY_PASSWORD: &str = "marquee-dummy-password";

pub struct AdminRepository {
    conn: DatabaseConnection,
    /// Hash checked when the username is unknown. Built with the same Argon2
    /// params as real accounts so both failure paths cost the same.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, dummy_hash: Arc<OnceCell<String>>) -> Self {
        Self { conn, dummy_hash }
    }

    pub async fn count(&self) -> Result<u64> {
        Admin::find()
            .count(&self.conn)
            .await
            .context("Failed to count admin accounts")
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<AdminAccount>> {
        let admin = Admin::find()
            .filter(admin::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin by username")?;

        Ok(admin.map(AdminAccount::from))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<AdminAccount>> {
        let admin = Admin::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin by ID")?;

        Ok(admin.map(AdminAccount::from))
    }

    /// Hashes the password and inserts the account; a taken username is
    /// reported through the unique index, not a prior lookup.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        must_change_password: bool,
        config: Option<&SecurityConfig>,
    ) -> Result<InsertOutcome<i32>> {
        let password = password.to_string();
        let config = config.cloned();
        let password_hash = task::spawn_blocking(move || hash_password(&password, config.as_ref()))
            .await
            .context("Password hashing task panicked")??;

        let active_model = admin::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            must_change_password: Set(must_change_password),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        match Admin::insert(active_model).exec(&self.conn).await {
            Ok(res) => Ok(InsertOutcome::Created(res.last_insert_id)),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Duplicate),
            Err(err) => Err(err).context("Failed to insert admin account"),
        }
    }

    pub(crate) async fn dummy_hash(&self, config: &SecurityConfig) -> Result<&str> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| {
                let config = config.clone();
                async move {
                    task::spawn_blocking(move || hash_password(DUMMY_PASSWORD, Some(&config)))
                        .await
                        .context("Password hashing task panicked")?
                }
            })
            .await?;
        Ok(hash.as_str())
    }

    /// An unparseable stored hash counts as a failed match.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Option<AdminIdentity>> {
        let Some(account) = self.get_by_username(username).await? else {
            let dummy = self.dummy_hash(config).await?.to_string();
            let _ = verify_password(dummy, password.to_string()).await;
            return Ok(None);
        };

        match verify_password(account.password_hash.clone(), password.to_string()).await {
            Ok(is_valid) => Ok(is_valid.then(|| account.identity())),
            Err(e) => {
                tracing::warn!(
                    admin = %account.username,
                    error = %e,
                    "Stored password hash is unreadable"
                );
                Ok(None)
            }
        }
    }

    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let admin = Admin::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin for password update")?
            .ok_or_else(|| anyhow::anyhow!("Admin not found: {id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: admin::ActiveModel = admin.into();
        active.password_hash = Set(new_hash);
        active.must_change_password = Set(false);
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Checks a password against a stored PHC string.
///
/// Argon2 is CPU-bound, so the comparison runs on the blocking pool. The
/// verifier compares digests in constant time.
pub async fn verify_password(stored_hash: String, supplied: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(supplied.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, the crate defaults are used.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
