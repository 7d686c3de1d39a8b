//! Typed wrapper over the four key-value primitives the rest of the service
//! needs from the coordination store.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("coordination store unavailable: {0}")]
    Unavailable(String),
}

/// The four primitives every backend must provide with per-key atomicity.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Atomic: sets `key` to `value` with `ttl` only if `key` is currently
    /// absent. Returns `true` on success, `false` if `key` was already set.
    async fn put_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Unconditional set with expiry, replacing whatever was there.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the current value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Removes `key`, a no-op if already absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Best-effort count of live keys under `prefix`, used only by the
    /// diagnostic `/api/stats` endpoint. Not required to be exact under
    /// concurrent mutation.
    async fn count_prefix(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Cheap liveness probe used by `/api/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn CoordinationStore>;

/// Key schema, kept in one place so the resolver, replay guard, and stats
/// endpoint agree on the exact byte layout.
pub fn triple_key(session_id: &str, triple_id: u64) -> String {
    format!("triple/{session_id}/{triple_id}")
}

pub fn request_key(session_id: &str, triple_id: u64, party_id: u8) -> String {
    format!("request/{session_id}/{triple_id}/{party_id}")
}

pub const TRIPLE_PREFIX: &str = "triple/";
pub const REQUEST_PREFIX: &str = "request/";

/// Builds the coordination-store backend selected by configuration.
pub async fn init(config: &crate::config::Config) -> anyhow::Result<SharedStore> {
    use crate::config::StoreBackend;
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory coordination store; state will not be shared across instances");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let store = redis_store::RedisStore::connect(&config.store_host, config.store_port).await?;
            Ok(Arc::new(store))
        }
    }
}
