//! Per-party one-shot marker enforcing at-most-once share delivery.

use crate::store::{request_key, CoordinationStore};
use crate::error::TtpError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    Granted,
    DoubleRequest,
}

/// Attempts to claim the `(session, triple_id, party)` slot. The marker's
/// TTL equals the triple TTL so a party can never legally re-request after
/// the marker expires but before the cached triple does.
pub async fn claim(
    store: &dyn CoordinationStore,
    session_id: &str,
    triple_id: u64,
    party_id: u8,
    ttl: Duration,
) -> Result<ReplayOutcome, TtpError> {
    let key = request_key(session_id, triple_id, party_id);
    let granted = store.put_if_absent(&key, b"1".to_vec(), ttl).await?;
    Ok(if granted {
        ReplayOutcome::Granted
    } else {
        ReplayOutcome::DoubleRequest
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn first_claim_is_granted_second_is_double_request() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(
            claim(&store, "s", 0, 0, ttl).await.unwrap(),
            ReplayOutcome::Granted
        );
        assert_eq!(
            claim(&store, "s", 0, 0, ttl).await.unwrap(),
            ReplayOutcome::DoubleRequest
        );
    }

    #[tokio::test]
    async fn distinct_parties_and_triple_ids_are_independent() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(
            claim(&store, "s", 0, 0, ttl).await.unwrap(),
            ReplayOutcome::Granted
        );
        assert_eq!(
            claim(&store, "s", 0, 1, ttl).await.unwrap(),
            ReplayOutcome::Granted
        );
        assert_eq!(
            claim(&store, "s", 1, 0, ttl).await.unwrap(),
            ReplayOutcome::Granted
        );
    }
}
