//! Modulus selection and reduction for the two rings the service supports.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ring a Beaver triple is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ring {
    /// `Z/2^64 Z`, represented natively with wrapping `u64` arithmetic.
    #[serde(rename = "Z2^64")]
    Word64,
    /// `Z/2Z`, a single bit.
    #[serde(rename = "Z2")]
    Binary,
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ring::Word64 => write!(f, "Z2^64"),
            Ring::Binary => write!(f, "Z2"),
        }
    }
}

impl Ring {
    /// Parses the wire representation of a ring name, rejecting anything
    /// outside the two enumerated rings.
    pub fn parse(name: &str) -> Option<Ring> {
        match name {
            "Z2^64" => Some(Ring::Word64),
            "Z2" => Some(Ring::Binary),
            _ => None,
        }
    }

    /// Samples a uniform element of this ring using a cryptographically
    /// strong random source. `WORD64` draws the full 64 bits, including
    /// values at or above `2^63`; `BINARY` draws a single bit.
    pub fn sample<R: RngCore>(self, rng: &mut R) -> u64 {
        match self {
            Ring::Word64 => rng.next_u64(),
            Ring::Binary => rng.next_u64() & 1,
        }
    }

    /// `a + b (mod m)`.
    pub fn add(self, a: u64, b: u64) -> u64 {
        match self {
            Ring::Word64 => a.wrapping_add(b),
            Ring::Binary => (a ^ b) & 1,
        }
    }

    /// `a - b (mod m)`, always returned in `[0, m)`.
    pub fn sub(self, a: u64, b: u64) -> u64 {
        match self {
            Ring::Word64 => a.wrapping_sub(b),
            Ring::Binary => (a ^ b) & 1,
        }
    }

    /// `a * b (mod m)`.
    pub fn mul(self, a: u64, b: u64) -> u64 {
        match self {
            Ring::Word64 => a.wrapping_mul(b),
            Ring::Binary => a & b & 1,
        }
    }
}
