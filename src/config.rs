//! Configuration Module
//!
//! Loads server and cache settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{CacheConfig, DEFAULT_MIN_FREE_MEMORY};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries, 0 = unbounded
    pub max_items: usize,
    /// Free memory floor in bytes, 0 = memory-pressure eviction off
    pub min_free_memory: u64,
    /// TTL in milliseconds applied to every write, 0 = no expiry
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ITEMS` - Maximum cache entries (default: 0, unbounded)
    /// - `MIN_FREE_MEMORY` - Free memory floor in bytes (default: 10 MiB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, off)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any name-to-value source. Missing or unparsable
    /// values fall back to the defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_items: parse_or(lookup("MAX_ITEMS"), defaults.max_items),
            min_free_memory: parse_or(lookup("MIN_FREE_MEMORY"), defaults.min_free_memory),
            default_ttl_ms: parse_or(lookup("DEFAULT_TTL_MS"), defaults.default_ttl_ms),
            server_port: parse_or(lookup("SERVER_PORT"), defaults.server_port),
        }
    }

    /// The eviction settings for the served cache.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_items: self.max_items,
            min_free_memory: self.min_free_memory,
            default_ttl_ms: self.default_ttl_ms,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: 0,
            min_free_memory: DEFAULT_MIN_FREE_MEMORY,
            default_ttl_ms: 0,
            server_port: 3000,
        }
    }
}
