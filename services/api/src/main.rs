use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use api::{AppState, cache::PageCache, routes};
use common::{
    cache::{RedisConfig, RedisPool},
    settings::ServerSettings,
    telemetry,
    token::{TokenConfig, TokenValidator},
};
use media::{CloudinaryConfig, CloudinaryUploader, PexelsClient, PexelsConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    info!("Starting media gateway");

    let token_config = TokenConfig::from_env()?;
    let pexels_config = PexelsConfig::from_env().map_err(anyhow::Error::msg)?;
    let provider = PexelsClient::new(pexels_config)?;

    let uploader = match CloudinaryConfig::from_env() {
        Some(config) => Some(CloudinaryUploader::new(config)?),
        None => {
            warn!("Cloudinary is not configured; uploads are disabled");
            None
        }
    };

    let cache = match RedisConfig::from_env() {
        Some(config) => {
            let pool = RedisPool::new(&config).await?;
            match pool.health_check().await {
                Ok(true) => info!("Redis connection successful"),
                _ => warn!("Redis is not reachable; pages will be fetched uncached"),
            }
            PageCache::new(pool, PageCache::ttl_from_env())
        }
        None => PageCache::disabled(),
    };

    let app_state = AppState {
        provider: Arc::new(provider),
        uploader,
        cache,
        tokens: TokenValidator::new(&token_config.secret),
    };

    let app = routes::create_router(app_state);

    let settings = ServerSettings::load("api", 3001)?;
    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("Media gateway listening on {}", settings.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
