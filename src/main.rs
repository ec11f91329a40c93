//! Entry point: load config, wire dependencies, and run the server.

use accounts::auth::TokenService;
use accounts::config::Config;
use accounts::db::{self, PgAccountStore};
use accounts::repositories::{MemoryRevocationStore, RedisRevocationStore, RevocationStore};
use accounts::{create_app, AccountService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    db::ensure_schema(&db_pool).await?;
    let accounts = AccountService::new(Arc::new(PgAccountStore::new(db_pool)));

    let revoked: Arc<dyn RevocationStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisRevocationStore::new(url)?),
        None => {
            tracing::warn!("REDIS_URL not set; revoked tokens are kept in memory");
            Arc::new(MemoryRevocationStore::new())
        }
    };
    let tokens = TokenService::new(
        &config.jwt_secret,
        chrono::Duration::minutes(config.access_token_ttl_minutes),
        chrono::Duration::days(config.refresh_token_ttl_days),
        revoked,
    );

    let app = create_app(AppState { accounts, tokens });

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
