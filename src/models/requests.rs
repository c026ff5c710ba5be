//! Request DTOs for the cache server API

use serde::Deserialize;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for `PUT /set` and `PUT /get-or-set`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store; an empty value is accepted but not stored
    pub value: String,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Request body for `POST /evict`
#[derive(Debug, Clone, Deserialize)]
pub struct EvictRequest {
    /// Number of least recently used entries to remove
    pub count: usize,
}

/// Request body for `PUT /config`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigUpdateRequest {
    #[serde(default)]
    pub max_items: Option<usize>,
    #[serde(default)]
    pub min_free_memory: Option<u64>,
    #[serde(default)]
    pub default_ttl_ms: Option<u64>,
}
