use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use auth::{
    AppState,
    jwt::JwtService,
    password::{HashConfig, PasswordHasher},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{InMemoryUserRepository, UserRepository, UserStore},
    routes,
    service::AuthService,
};
use common::{
    database::{self, DatabaseConfig},
    settings::ServerSettings,
    telemetry,
    token::TokenConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    info!("Starting authentication service");

    let store: Arc<dyn UserStore> = if std::env::var("AUTH_IN_MEMORY_STORE").is_ok() {
        warn!("Using in-memory user store; users are lost on restart");
        Arc::new(InMemoryUserRepository::new())
    } else {
        let db_config = DatabaseConfig::from_env()?;
        let pool = database::init_pool(&db_config).await?;

        if !database::health_check(&pool).await? {
            anyhow::bail!("Failed to connect to database");
        }

        let repository = UserRepository::new(pool);
        repository.ensure_schema().await?;
        Arc::new(repository)
    };

    let jwt_service = JwtService::new(TokenConfig::from_env()?);
    let hasher = PasswordHasher::new(HashConfig::from_env())?;
    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());

    let app_state = AppState {
        auth: AuthService::new(store, hasher, jwt_service, rate_limiter)?,
    };

    let app = routes::create_router(app_state);

    let settings = ServerSettings::load("auth", 3000)?;
    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("Authentication service listening on {}", settings.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
