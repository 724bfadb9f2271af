use std::sync::Arc;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::script::cache::ScriptCache;
use crate::script::provider::ScriptBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or seed-file catalog, chosen at startup.
    pub catalog: Arc<dyn CatalogStore>,
    /// Anthropic, mock, or unavailable. Resolved from config at startup.
    pub script_backend: ScriptBackend,
    /// Redis when `REDIS_URL` is set, otherwise process-local.
    pub script_cache: Option<Arc<dyn ScriptCache>>,
    pub config: Config,
}
