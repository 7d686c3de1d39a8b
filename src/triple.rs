//! Beaver triple sampling and additive secret sharing.

use crate::ring::Ring;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// One party's additive share of a triple: `(a_i, b_i, c_i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

/// The materialized artifact cached at `triple/{session}/{triple_id}`: the
/// ring both shares were drawn from, plus one share per party. Immutable
/// once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleRecord {
    pub ring: Ring,
    pub share0: Share,
    pub share1: Share,
}

impl TripleRecord {
    pub fn share_for(&self, party: u8) -> Option<Share> {
        match party {
            0 => Some(self.share0),
            1 => Some(self.share1),
            _ => None,
        }
    }
}

/// Samples `a, b` uniformly from the ring, computes `c = a * b`, and splits
/// all three into additive shares for party 0 and party 1. Always uses the
/// platform's cryptographic RNG; never seed this from observable state.
pub fn generate(ring: Ring) -> TripleRecord {
    let mut rng = OsRng;

    let a = ring.sample(&mut rng);
    let b = ring.sample(&mut rng);
    let c = ring.mul(a, b);

    let a0 = ring.sample(&mut rng);
    let b0 = ring.sample(&mut rng);
    let c0 = ring.sample(&mut rng);

    let a1 = ring.sub(a, a0);
    let b1 = ring.sub(b, b0);
    let c1 = ring.sub(c, c0);

    TripleRecord {
        ring,
        share0: Share { a: a0, b: b0, c: c0 },
        share1: Share { a: a1, b: b1, c: c1 },
    }
}
