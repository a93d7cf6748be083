use std::sync::Arc;

use crate::auth::revocation::RevocationList;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: knowmaint_db::DbPool,
    /// Server configuration (JWT keys and lifetimes live here).
    pub config: Arc<ServerConfig>,
    /// Revoked token ids, Redis-backed in production.
    pub revocation: Arc<dyn RevocationList>,
}
