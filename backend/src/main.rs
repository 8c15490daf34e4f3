use std::sync::Arc;

use taskflow_server::config::{Config, DEV_JWT_SECRET};
use taskflow_server::store::{MemoryStore, RedisStore, Store};
use taskflow_server::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    if config.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
    }

    let store: Arc<dyn Store> = if config.uses_memory_store() {
        tracing::info!("using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(redis_url = %config.redis_url, "using redis store");
        Arc::new(RedisStore::open(&config.redis_url)?)
    };

    let app = taskflow_server::app(AppState::new(store, &config.jwt_secret), &config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
