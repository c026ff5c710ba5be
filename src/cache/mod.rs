//! Cache Module
//!
//! In-process key/value cache with LRU ordering and three eviction policies:
//! capacity, TTL and host memory pressure.

mod config;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use config::{CacheConfig, CacheSettings, DEFAULT_MIN_FREE_MEMORY};
pub use entry::{current_timestamp_ms, CacheEntry, CacheValue};
pub use lru::LruIndex;
pub use stats::CacheStats;
pub use store::{
    Cache, EvictionHook, INLINE_PRESSURE_DIVISOR, PRESSURE_COOLDOWN, SCHEDULER_PRESSURE_DIVISOR,
};
