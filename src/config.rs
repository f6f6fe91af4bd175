use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{bootstrap, limits, tmdb};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub tmdb: TmdbConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Directory with the built frontend; served as the router fallback when present.
    pub static_path: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/marquee.db".to_string(),
            log_level: "info".to_string(),
            static_path: "frontend".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// v3 API key; usually supplied through `TMDB_API_KEY`.
    pub api_key: Option<String>,

    pub base_url: String,

    /// Poster CDN prefix; the poster path is appended verbatim.
    pub image_base_url: String,

    pub request_timeout_seconds: u64,

    pub language: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: tmdb::API_BASE_URL.to_string(),
            image_base_url: tmdb::IMAGE_BASE_URL.to_string(),
            request_timeout_seconds: 10,
            language: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local map; sessions vanish on restart.
    #[default]
    Memory,

    /// Rows in the application database, shared by every instance using it.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_backend: SessionBackend,

    pub session_idle_minutes: i64,

    /// Cookie signing secret; usually supplied through `SECRET_KEY`.
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            secure_cookies: false,
            session_backend: SessionBackend::Memory,
            session_idle_minutes: 60,
            session_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub bootstrap_admin_username: String,

    /// Password for the first admin. When unset outside production the
    /// well-known default is seeded and flagged for rotation.
    #[serde(skip_serializing)]
    pub bootstrap_admin_password: Option<String>,

    /// Production mode refuses to start with default admin credentials.
    pub production: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            bootstrap_admin_username: bootstrap::ADMIN_USERNAME.to_string(),
            bootstrap_admin_password: None,
            production: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found (or defaults), then layers the
    /// environment on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `TMDB_API_KEY`, `SECRET_KEY`, `MARQUEE_ADMIN_PASSWORD` and
    /// `DATABASE_URL`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(secret) = var("SECRET_KEY") {
            self.server.session_secret = Some(secret);
        }
        if let Some(password) = var("MARQUEE_ADMIN_PASSWORD") {
            self.security.bootstrap_admin_password = Some(password);
        }
        if let Some(url) = var("DATABASE_URL") {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("marquee").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".marquee").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.tmdb.base_url.trim().is_empty() {
            anyhow::bail!("TMDB base URL cannot be empty");
        }

        if self.tmdb.request_timeout_seconds == 0 {
            anyhow::bail!("TMDB request timeout must be > 0");
        }

        if self.server.session_idle_minutes <= 0 {
            anyhow::bail!("Session idle timeout must be > 0");
        }

        if let Some(secret) = &self.server.session_secret
            && secret.len() < limits::MIN_SESSION_SECRET_LEN
        {
            anyhow::bail!(
                "Session secret must be at least {} bytes",
                limits::MIN_SESSION_SECRET_LEN
            );
        }

        if self.security.production && self.security.bootstrap_admin_password.is_none() {
            anyhow::bail!(
                "Production mode requires MARQUEE_ADMIN_PASSWORD (or security.bootstrap_admin_password)"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.tmdb.request_timeout_seconds, 10);
        assert_eq!(config.tmdb.image_base_url, "https://image.tmdb.org/t/p/w500");
        assert_eq!(config.server.session_backend, SessionBackend::Memory);
        assert!(config.tmdb.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_hides_secrets() {
        let mut config = Config::default();
        config.server.session_secret = Some("s".repeat(40));
        config.security.bootstrap_admin_password = Some("hunter22".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[tmdb]"));
        assert!(!toml_str.contains("hunter22"));
        assert!(!toml_str.contains(&"s".repeat(40)));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 8080
            session_backend = "sqlite"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_backend, SessionBackend::Sqlite);

        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TMDB_API_KEY", "abc123"),
            ("SECRET_KEY", ""),
            ("DATABASE_URL", "sqlite::memory:"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(ToString::to_string));

        assert_eq!(config.tmdb.api_key.as_deref(), Some("abc123"));
        assert!(config.server.session_secret.is_none());
        assert_eq!(config.general.database_path, "sqlite::memory:");
    }

    #[test]
    fn test_validation_rules() {
        let mut config = Config::default();
        config.server.session_secret = Some("short".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.production = true;
        assert!(config.validate().is_err());
        config.security.bootstrap_admin_password = Some("a-strong-password".to_string());
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.tmdb.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
