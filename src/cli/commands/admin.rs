//! Create admin command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthError, AuthService, SeaOrmAuthService};

pub async fn cmd_create_admin(
    config: &Config,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let service = SeaOrmAuthService::new(store, config.security.clone());

    match service.create_admin(username, password).await {
        Ok(id) => {
            println!("✓ Admin '{}' created (id {})", username.trim(), id);
            Ok(())
        }
        Err(AuthError::DuplicateUsername(name)) => {
            println!("Admin '{name}' already exists.");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create admin: {e}")),
    }
}
