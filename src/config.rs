//! Environment-driven configuration, parsed with `clap` rather than
//! hand-rolled `std::env::var` calls scattered through `main`.

use crate::resolver::ResolverConfig;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "beaver-ttp", about = "Trusted third party for Beaver multiplication triples")]
pub struct Config {
    /// Coordination-store host.
    #[arg(long, env("STORE_HOST"), default_value = "127.0.0.1")]
    pub store_host: String,

    /// Coordination-store port.
    #[arg(long, env("STORE_PORT"), default_value_t = 6379)]
    pub store_port: u16,

    /// Which coordination-store backend to use. `memory` is for local
    /// development and tests; it holds no state across process restarts.
    #[arg(long, env("STORE_BACKEND"), value_enum, default_value_t = StoreBackend::Redis)]
    pub store_backend: StoreBackend,

    /// TTL, in seconds, applied to published triples and replay markers.
    #[arg(long, env("TTL"), default_value_t = 300)]
    pub ttl_seconds: u64,

    /// TTL, in seconds, applied to the generation sentinel (`T_lock`).
    #[arg(long, env("LOCK_TTL"), default_value_t = 10)]
    pub lock_ttl_seconds: u64,

    /// Follower poll interval `S`, in milliseconds.
    #[arg(long, env("POLL_INTERVAL_MS"), default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Follower poll attempts `W`.
    #[arg(long, env("POLL_ATTEMPTS"), default_value_t = 20)]
    pub poll_attempts: u32,

    /// HTTP listen port.
    #[arg(long, env("LISTEN_PORT"), default_value_t = 8090)]
    pub listen_port: u16,
}

impl Config {
    pub fn triple_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            triple_ttl: self.triple_ttl(),
            lock_ttl: Duration::from_secs(self.lock_ttl_seconds),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_attempts: self.poll_attempts,
        }
    }
}
