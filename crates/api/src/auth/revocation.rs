//! Token revocation list.
//!
//! A set of token ids (`jti`), each with its own expiry. Logging out adds
//! the token's `jti`; rotating a refresh token claims it with
//! [`RevocationList::claim`]. Every token validation asks
//! [`RevocationList::is_revoked`] before trusting the token.
//!
//! Entries only need to outlive the token they revoke, so each is written
//! with the token's remaining lifetime as its TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;

const KEY_PREFIX: &str = "blacklist:";

/// Failure talking to the revocation store.
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("Revocation store error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Storage for revoked token ids.
#[async_trait]
pub trait RevocationList: Send + Sync {
    /// Mark `jti` as revoked for `ttl`.
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Whether `jti` is currently revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError>;

    /// Revoke `jti` for `ttl` only if it is not revoked yet.
    ///
    /// Returns `false` when another caller got there first. Check and write
    /// happen as one step, so of two concurrent claims exactly one wins.
    async fn claim(&self, jti: &str, ttl: Duration) -> Result<bool, RevocationError>;
}

// ---------------------------------------------------------------------------
// Redis
// ---------------------------------------------------------------------------

/// Revocation list shared by every API instance, backed by Redis.
///
/// Keys are `blacklist:{jti}`, written with `SET .. EX` so Redis drops them
/// once the token could no longer validate anyway.
#[derive(Clone)]
pub struct RedisRevocationList {
    conn: ConnectionManager,
}

impl RedisRevocationList {
    /// Connect to Redis at `url` (e.g. `redis://localhost:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, RevocationError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RevocationList for RedisRevocationList {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut conn = self.conn.clone();
        // EX 0 is rejected by Redis.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(format!("{KEY_PREFIX}{jti}"), "1", seconds)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(format!("{KEY_PREFIX}{jti}")).await?;
        Ok(exists)
    }

    async fn claim(&self, jti: &str, ttl: Duration) -> Result<bool, RevocationError> {
        let mut conn = self.conn.clone();
        // Nil reply means the key already existed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(format!("{KEY_PREFIX}{jti}"))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }
}

// ---------------------------------------------------------------------------
// In-process
// ---------------------------------------------------------------------------

/// Process-local revocation list.
///
/// Used by the test harness, and by the server when `REDIS_URL` is unset.
/// Entries are lost on restart and not shared between instances.
#[derive(Debug, Default)]
pub struct MemoryRevocationList {
    entries: RwLock<HashMap<String, Instant>>,
}

impl MemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationList for MemoryRevocationList {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(jti.to_string(), now + ttl);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(jti)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }

    async fn claim(&self, jti: &str, ttl: Duration) -> Result<bool, RevocationError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);
        if entries.contains_key(jti) {
            return Ok(false);
        }
        entries.insert(jti.to_string(), now + ttl);
        Ok(true)
    }
}
