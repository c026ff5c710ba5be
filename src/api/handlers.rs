//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Cache calls are
//! short and never block on I/O, so they run directly on the async worker.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cache, CacheConfig};
use crate::error::{CacheError, Result};
use crate::memory::{MemorySampler, SysMemStats};
use crate::models::{
    ConfigUpdateRequest, DeleteResponse, EvictRequest, EvictResponse, GetOrSetResponse,
    GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The served cache; it carries its own lock
    pub cache: Arc<Cache<String>>,
    /// Sampler behind `GET /memory`
    pub memory: Arc<MemorySampler>,
}

impl AppState {
    /// Creates a new AppState reporting memory through the process-wide sampler.
    pub fn new(cache: Cache<String>) -> Self {
        Self {
            cache: Arc::new(cache),
            memory: MemorySampler::global(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Cache::with_config(config.cache_config()))
    }

    /// Uses `sampler` for both the cache's pressure check and `GET /memory`.
    pub fn with_memory_sampler(cache: Cache<String>, sampler: Arc<MemorySampler>) -> Self {
        Self {
            cache: Arc::new(cache.with_memory_sampler(sampler.clone())),
            memory: sampler,
        }
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let stored = !req.value.is_empty();
    state.cache.put(req.key.clone(), req.value);

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for PUT /get-or-set
pub async fn get_or_set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<GetOrSetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    match state.cache.get_or_put(req.key.clone(), req.value) {
        (Some(value), loaded) => Ok(Json(GetOrSetResponse {
            key: req.key,
            value,
            loaded,
        })),
        (None, _) => Err(CacheError::NotFound(req.key)),
    }
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.del(&key);
    Json(DeleteResponse::new(key))
}

/// Handler for POST /evict
pub async fn evict_handler(
    State(state): State<AppState>,
    Json(req): Json<EvictRequest>,
) -> Json<EvictResponse> {
    let evicted = state.cache.evict(req.count);
    Json(EvictResponse {
        evicted,
        remaining: state.cache.len(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(&stats, state.cache.config()))
}

/// Handler for PUT /config
///
/// New settings apply from the next cache operation on.
pub async fn config_handler(
    State(state): State<AppState>,
    Json(req): Json<ConfigUpdateRequest>,
) -> Json<CacheConfig> {
    if let Some(max_items) = req.max_items {
        state.cache.set_max_items(max_items);
    }
    if let Some(bytes) = req.min_free_memory {
        state.cache.set_min_free_memory(bytes);
    }
    if let Some(ttl_ms) = req.default_ttl_ms {
        state.cache.set_default_ttl(Duration::from_millis(ttl_ms));
    }
    Json(state.cache.config())
}

/// Handler for GET /memory
pub async fn memory_handler(State(state): State<AppState>) -> Result<Json<SysMemStats>> {
    Ok(Json(state.memory.sample()?))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
