//! Response DTOs for the cache server API

use serde::Serialize;

use crate::cache::{CacheConfig, CacheStats};

/// Response body for `GET /get/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for `PUT /set`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    /// False when the value was empty and therefore ignored
    pub stored: bool,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Empty value for key '{}' ignored", key)
        };
        Self {
            message,
            key,
            stored,
        }
    }
}

/// Response body for `PUT /get-or-set`
#[derive(Debug, Clone, Serialize)]
pub struct GetOrSetResponse {
    pub key: String,
    pub value: String,
    /// True if the value was already cached
    pub loaded: bool,
}

/// Response body for `DELETE /del/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for `POST /evict`
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    pub evicted: usize,
    pub remaining: usize,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub pressure_events: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Settings in effect when the snapshot was taken
    pub config: CacheConfig,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, config: CacheConfig) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            pressure_events: stats.pressure_events,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            config,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
