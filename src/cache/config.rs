//! Cache Settings Module
//!
//! The three eviction knobs of a cache, held as independent atomics so they
//! can be changed while an eviction pass is running.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::entry::ttl_to_millis;

/// Default memory floor: 10 MiB.
pub const DEFAULT_MIN_FREE_MEMORY: u64 = 10 * 1024 * 1024;

// == Cache Config ==
/// Plain snapshot of a cache's eviction settings.
///
/// A zero in any field disables that policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Hard cap on entry count
    pub max_items: usize,
    /// Free host memory floor in bytes
    pub min_free_memory: u64,
    /// TTL applied to every write, in milliseconds
    pub default_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: 0,
            min_free_memory: DEFAULT_MIN_FREE_MEMORY,
            default_ttl_ms: 0,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

// == Cache Settings ==
/// Live, lock-free settings block owned by one cache.
///
/// Writes become visible to the next operation that reads them; there is no
/// barrier against an eviction pass already in flight.
#[derive(Debug, Default)]
pub struct CacheSettings {
    max_items: AtomicUsize,
    min_free_memory: AtomicU64,
    default_ttl_ms: AtomicU64,
}

impl CacheSettings {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            max_items: AtomicUsize::new(config.max_items),
            min_free_memory: AtomicU64::new(config.min_free_memory),
            default_ttl_ms: AtomicU64::new(config.default_ttl_ms),
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items.load(Ordering::Relaxed)
    }

    pub fn set_max_items(&self, v: usize) {
        self.max_items.store(v, Ordering::Relaxed);
    }

    pub fn min_free_memory(&self) -> u64 {
        self.min_free_memory.load(Ordering::Relaxed)
    }

    pub fn set_min_free_memory(&self, v: u64) {
        self.min_free_memory.store(v, Ordering::Relaxed);
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms.load(Ordering::Relaxed))
    }

    pub fn set_default_ttl(&self, ttl: Duration) {
        self.default_ttl_ms
            .store(ttl_to_millis(ttl), Ordering::Relaxed);
    }

    /// Reads all three settings. Each field is read independently.
    pub fn snapshot(&self) -> CacheConfig {
        CacheConfig {
            max_items: self.max_items(),
            min_free_memory: self.min_free_memory(),
            default_ttl_ms: self.default_ttl_ms.load(Ordering::Relaxed),
        }
    }
}
