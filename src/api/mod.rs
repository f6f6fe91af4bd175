use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use rand::Rng;
use sha2::{Digest, Sha512};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{Config, ServerConfig, SessionBackend};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod extract;
mod movies;
mod observability;
mod public;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn recommendation_service(&self) -> &Arc<dyn crate::services::RecommendationService> {
        &self.shared.recommendation_service
    }

    #[must_use]
    pub fn catalog(&self) -> &crate::services::CatalogService {
        &self.shared.catalog
    }

    #[must_use]
    pub fn user_service(&self) -> &crate::services::UserService {
        &self.shared.user_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let (static_path, server) = {
        let config = state.config();
        (config.general.static_path.clone(), config.server.clone())
    };

    let key = session_key(&server);

    let admin_routes = match server.session_backend {
        SessionBackend::Memory => {
            admin_router().layer(session_layer(MemoryStore::default(), &server, key))
        }
        SessionBackend::Sqlite => {
            let pool = state.store().conn.get_sqlite_connection_pool().clone();
            let session_store = SqliteStore::new(pool);
            session_store.migrate().await?;

            tokio::spawn(
                session_store
                    .clone()
                    .continuously_delete_expired(tokio::time::Duration::from_secs(300)),
            );

            admin_router().layer(session_layer(session_store, &server, key))
        }
    };

    let app = Router::new()
        .route("/", get(public::index))
        .route("/health", get(public::health))
        .route("/trending", get(public::trending))
        .route("/popular", get(public::popular))
        .route("/top-rated", get(public::top_rated))
        .route("/upcoming", get(public::upcoming))
        .route("/now-playing", get(public::now_playing))
        .route("/search", get(public::search))
        .route("/recommendations", get(public::recommendations))
        .route("/users", post(users::create_user))
        .route("/api/movie/{id}", get(movies::movie_details))
        .route("/api/genres", get(movies::genres))
        .nest("/admin", admin_routes)
        .with_state(state);

    let app = if Path::new(&static_path).is_dir() {
        app.fallback_service(ServeDir::new(static_path))
    } else {
        app.fallback(not_found)
    };

    Ok(app
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware)))
}

fn admin_router() -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/recommendations", get(admin::list_recommendations))
        .route("/add", post(admin::add_movie))
        .route("/delete/{id}", delete(admin::delete_movie))
        .route("/users", get(admin::list_users))
        .route("/password", put(auth::change_password))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .merge(protected)
        .route("/login-page", get(auth::login_page))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/check-auth", get(auth::check_auth))
}

fn session_layer<S: SessionStore + Clone>(
    store: S,
    server: &ServerConfig,
    key: Key,
) -> SessionManagerLayer<S, tower_sessions::service::SignedCookie> {
    SessionManagerLayer::new(store)
        .with_secure(server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_idle_minutes,
        )))
        .with_signed(key)
}

/// Cookie signing key: SHA-512 of the configured secret, or random per process.
fn session_key(server: &ServerConfig) -> Key {
    if let Some(secret) = &server.session_secret {
        return Key::from(Sha512::digest(secret.as_bytes()).as_slice());
    }

    tracing::warn!("SECRET_KEY is not set; using a random session key (sessions end on restart)");
    let mut bytes = [0u8; 64];
    rand::rng().fill(&mut bytes[..]);
    Key::from(&bytes[..])
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}
