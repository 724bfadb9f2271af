use anyhow::{bail, Context, Result};

const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SUBJECT_HEADER: &str = "x-authenticated-subject";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres catalog. Takes precedence over `catalog_seed_path`.
    pub database_url: Option<String>,
    /// JSON seed file for the in-memory catalog.
    pub catalog_seed_path: Option<String>,
    /// Redis result cache. The in-process cache is used when unset.
    pub redis_url: Option<String>,
    pub script_cache_ttl_secs: u64,
    /// Missing key is not fatal at startup; generation fails per request instead.
    pub anthropic_api_key: Option<String>,
    pub mock_script: bool,
    pub llm_timeout_secs: u64,
    /// Header carrying the subject id verified by the fronting identity provider.
    pub auth_subject_header: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: optional_env("DATABASE_URL"),
            catalog_seed_path: optional_env("CATALOG_SEED_PATH"),
            redis_url: optional_env("REDIS_URL"),
            script_cache_ttl_secs: parse_env("SCRIPT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            mock_script: optional_env("MOCK_SCRIPT")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            auth_subject_header: optional_env("AUTH_SUBJECT_HEADER")
                .unwrap_or_else(|| DEFAULT_SUBJECT_HEADER.to_string())
                .to_ascii_lowercase(),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };

        if config.database_url.is_none() && config.catalog_seed_path.is_none() {
            bail!("Either DATABASE_URL or CATALOG_SEED_PATH must be set");
        }
        if config.llm_timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }

        Ok(config)
    }
}

/// Reads a variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
