//! Configuration Module
//!
//! Loads server and cache settings from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Optional cache capacity bound, 0 = unbounded
    pub max_entries: usize,
    /// Background purge interval in seconds
    pub cleanup_interval: u64,
    /// Populate the cache at startup
    pub warmup_enabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity, 0 for unbounded (default: 0)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 30)
    /// - `CACHE_WARMUP` - `true` or `false` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            max_entries: env_or("CACHE_MAX_ENTRIES", defaults.max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            warmup_enabled: env_or("CACHE_WARMUP", defaults.warmup_enabled),
        }
    }

    /// Capacity bound in the form the cache store takes.
    pub fn cache_capacity(&self) -> Option<usize> {
        (self.max_entries > 0).then_some(self.max_entries)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_entries: 0,
            cleanup_interval: 30,
            warmup_enabled: true,
        }
    }
}
