use std::sync::Arc;

use crate::clients::{MetadataProvider, TmdbClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, RecommendationService, SeaOrmAuthService,
    SeaOrmRecommendationService, UserService,
};

/// Build a shared HTTP client for outbound metadata calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Marquee/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub recommendation_service: Arc<dyn RecommendationService>,

    pub catalog: CatalogService,

    pub user_service: UserService,
}

impl SharedState {
    /// Opens the database, seeds the bootstrap admin and builds the TMDB client.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds)?;
        let tmdb = TmdbClient::with_shared_client(http_client, &config.tmdb);
        Self::with_metadata_provider(config, Arc::new(tmdb)).await
    }

    pub async fn with_metadata_provider(
        config: Config,
        metadata: Arc<dyn MetadataProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store.bootstrap_admin(&config.security).await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let recommendation_service = Arc::new(SeaOrmRecommendationService::new(
            store.clone(),
            metadata.clone(),
            config.tmdb.image_base_url.clone(),
        )) as Arc<dyn RecommendationService>;

        Ok(Self {
            catalog: CatalogService::new(metadata),
            user_service: UserService::new(store.clone()),
            config: Arc::new(config),
            store,
            auth_service,
            recommendation_service,
        })
    }
}
