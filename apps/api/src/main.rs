mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod script;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{CatalogStore, InMemoryCatalog, PgCatalogStore};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, MockScriptProvider};
use crate::routes::build_router;
use crate::script::cache::{InMemoryScriptCache, RedisScriptCache, ScriptCache};
use crate::script::provider::ScriptBackend;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing catalog source)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lesson API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = build_catalog(&config).await?;

    let script_cache = build_script_cache(&config)?;

    let script_backend = build_script_backend(&config);
    info!("Script backend: {}", script_backend.describe());

    // Build app state
    let state = AppState {
        catalog,
        script_backend,
        script_cache,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise the seed file.
async fn build_catalog(config: &Config) -> Result<Arc<dyn CatalogStore>> {
    if let Some(database_url) = &config.database_url {
        let pool = create_pool(database_url).await?;
        return Ok(Arc::new(PgCatalogStore::new(pool)));
    }

    let seed_path = config
        .catalog_seed_path
        .as_deref()
        .context("CATALOG_SEED_PATH is required when DATABASE_URL is not set")?;
    Ok(Arc::new(InMemoryCatalog::from_seed_file(seed_path)?))
}

fn build_script_cache(config: &Config) -> Result<Option<Arc<dyn ScriptCache>>> {
    match &config.redis_url {
        Some(redis_url) => {
            let client = redis::Client::open(redis_url.as_str())?;
            info!("Redis script cache initialized");
            Ok(Some(Arc::new(RedisScriptCache::new(client))))
        }
        None => {
            info!("REDIS_URL not set; using in-process script cache");
            Ok(Some(Arc::new(InMemoryScriptCache::new())))
        }
    }
}

/// A missing or malformed key is reported per request, not at startup.
fn build_script_backend(config: &Config) -> ScriptBackend {
    if config.mock_script {
        warn!("MOCK_SCRIPT enabled; scripts are generated by the deterministic stub");
        return ScriptBackend::Ready(Arc::new(MockScriptProvider));
    }

    let Some(api_key) = &config.anthropic_api_key else {
        warn!("ANTHROPIC_API_KEY not set; script generation is unavailable");
        return ScriptBackend::Unavailable("ANTHROPIC_API_KEY is not set".to_string());
    };

    match LlmClient::new(api_key, Duration::from_secs(config.llm_timeout_secs)) {
        Ok(client) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            ScriptBackend::Ready(Arc::new(client))
        }
        Err(e) => {
            warn!("LLM client could not be initialized: {e}");
            ScriptBackend::Unavailable(e.to_string())
        }
    }
}
