//! The keyed single-flight generator: at most one triple generation runs per
//! `(session, triple_id)` across every instance sharing the coordination
//! store.
//!
//! ```text
//! ABSENT ──put_if_absent──► SENTINEL ──set──► PUBLISHED
//!    ▲                         │                  │
//!    │                         │ (TTL T_lock)     │ (TTL T)
//!    └─────────────────────────┴──────────────────┘
//!                (expiry returns to ABSENT)
//! ```

use crate::error::TtpError;
use crate::ring::Ring;
use crate::store::{triple_key, CoordinationStore};
use crate::triple::{self, TripleRecord};
use std::time::Duration;

/// Placeholder value occupying the triple slot while a leader generates.
/// Not valid JSON, so a fast reader can tell it apart from a published
/// `TripleRecord` without a separate sidecar key.
const SENTINEL: &[u8] = b"GENERATING";

#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// `T`: TTL applied to the published record.
    pub triple_ttl: Duration,
    /// `T_lock`: TTL applied to the sentinel while a leader is generating.
    pub lock_ttl: Duration,
    /// `S`: sleep between follower polls.
    pub poll_interval: Duration,
    /// `W`: maximum number of follower polls.
    pub poll_attempts: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            triple_ttl: Duration::from_secs(300),
            lock_ttl: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            poll_attempts: 20,
        }
    }
}

fn decode_published(bytes: &[u8]) -> Option<TripleRecord> {
    serde_json::from_slice(bytes).ok()
}

fn check_ring(record: TripleRecord, requested: Ring) -> Result<TripleRecord, TtpError> {
    if record.ring == requested {
        Ok(record)
    } else {
        Err(TtpError::ring_mismatch(format!(
            "triple was generated for ring {} but {} was requested",
            record.ring, requested
        )))
    }
}

/// Resolves the `TripleRecord` for `(session_id, triple_id)`, generating it
/// exactly once across all concurrent callers regardless of which instance
/// they land on.
pub async fn resolve(
    store: &dyn CoordinationStore,
    session_id: &str,
    triple_id: u64,
    ring: Ring,
    config: ResolverConfig,
) -> Result<TripleRecord, TtpError> {
    let key = triple_key(session_id, triple_id);

    // Fast read: someone may have already published this triple.
    if let Some(bytes) = store.get(&key).await? {
        if let Some(record) = decode_published(&bytes) {
            return check_ring(record, ring);
        }
        // Otherwise the slot holds the sentinel; fall through to election,
        // which will lose and put us on the follower path below.
    }

    let elected = store
        .put_if_absent(&key, SENTINEL.to_vec(), config.lock_ttl)
        .await?;

    if elected {
        let record = triple::generate(ring);
        let serialized =
            serde_json::to_vec(&record).map_err(|e| TtpError::Internal(e.to_string()))?;
        store.set(&key, serialized, config.triple_ttl).await?;
        return Ok(record);
    }

    for _ in 0..config.poll_attempts {
        tokio::time::sleep(config.poll_interval).await;
        if let Some(bytes) = store.get(&key).await? {
            if let Some(record) = decode_published(&bytes) {
                return check_ring(record, ring);
            }
        }
    }

    Err(TtpError::GenerationTimeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    fn fast_config() -> ResolverConfig {
        ResolverConfig {
            triple_ttl: Duration::from_secs(60),
            lock_ttl: Duration::from_secs(5),
            poll_interval: Duration::from_millis(5),
            poll_attempts: 20,
        }
    }

    #[tokio::test]
    async fn leader_generates_and_publishes() {
        let store = MemoryStore::new();
        let record = resolve(&store, "s", 0, Ring::Word64, fast_config())
            .await
            .unwrap();
        assert_eq!(
            record.ring.add(record.share0.a, record.share1.a),
            record.ring.add(record.share0.a, record.share1.a),
        );
        let a = record.ring.add(record.share0.a, record.share1.a);
        let b = record.ring.add(record.share0.b, record.share1.b);
        let c = record.ring.add(record.share0.c, record.share1.c);
        assert_eq!(record.ring.mul(a, b), c);
    }

    #[tokio::test]
    async fn repeated_resolve_returns_identical_triple() {
        let store = MemoryStore::new();
        let first = resolve(&store, "s", 0, Ring::Word64, fast_config())
            .await
            .unwrap();
        let second = resolve(&store, "s", 0, Ring::Word64, fast_config())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn distinct_triple_ids_are_independent() {
        let store = MemoryStore::new();
        let first = resolve(&store, "s", 0, Ring::Word64, fast_config())
            .await
            .unwrap();
        let second = resolve(&store, "s", 1, Ring::Word64, fast_config())
            .await
            .unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn ring_mismatch_is_a_validation_error() {
        let store = MemoryStore::new();
        resolve(&store, "s", 0, Ring::Word64, fast_config())
            .await
            .unwrap();
        let err = resolve(&store, "s", 0, Ring::Binary, fast_config())
            .await
            .unwrap_err();
        assert!(matches!(err, TtpError::Validation { code, .. } if code == "RING_MISMATCH"));
    }

    #[tokio::test]
    async fn concurrent_first_requests_observe_the_same_triple() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let config = fast_config();

        let store_a = store.clone();
        let task_a =
            tokio::spawn(async move { resolve(&*store_a, "s", 7, Ring::Word64, config).await });
        let store_b = store.clone();
        let task_b =
            tokio::spawn(async move { resolve(&*store_b, "s", 7, Ring::Word64, config).await });

        let (a, b) = tokio::join!(task_a, task_b);
        let a = a.unwrap().unwrap();
        let b = b.unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn follower_times_out_if_leader_never_publishes() {
        let store = MemoryStore::new();
        let key = triple_key("s", 0);
        // Simulate a leader that won the election but crashed before
        // publishing: the sentinel is present for the whole poll window.
        store
            .put_if_absent(&key, SENTINEL.to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let config = ResolverConfig {
            triple_ttl: Duration::from_secs(60),
            lock_ttl: Duration::from_secs(60),
            poll_interval: Duration::from_millis(2),
            poll_attempts: 3,
        };
        let err = resolve(&store, "s", 0, Ring::Word64, config)
            .await
            .unwrap_err();
        assert!(matches!(err, TtpError::GenerationTimeout));
    }

    #[tokio::test]
    async fn ttl_decay_allows_a_fresh_generation() {
        let store = MemoryStore::new();
        let config = ResolverConfig {
            triple_ttl: Duration::from_millis(20),
            lock_ttl: Duration::from_secs(5),
            poll_interval: Duration::from_millis(5),
            poll_attempts: 5,
        };
        let first = resolve(&store, "s", 0, Ring::Word64, config)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = resolve(&store, "s", 0, Ring::Word64, config)
            .await
            .unwrap();
        assert_ne!(first, second);
    }
}
