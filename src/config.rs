//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Preview cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for memoized preview lookups
    pub cache_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PREVIEW_CACHE_TTL` - Lookup TTL in seconds (default: 30)
    /// - `PREVIEW_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            cache_ttl: env::var("PREVIEW_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            cleanup_interval: env::var("PREVIEW_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Returns the lookup TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: 30,
            cleanup_interval: 60,
        }
    }
}
