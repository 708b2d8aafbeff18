use std::sync::Arc;

use serde_json::Value;
use sro_core::cache::MemoCache;

use crate::config::ServerConfig;

/// Cache of shaped response payloads, keyed by request.
pub type ResponseCache = MemoCache<Value>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sro_db::DbPool,
    /// Server configuration (timeouts and cache TTLs).
    pub config: Arc<ServerConfig>,
    /// Memoizing cache built once at startup.
    pub cache: Arc<ResponseCache>,
}
