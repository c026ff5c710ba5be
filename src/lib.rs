//! Pressure Cache - an in-process key/value cache with bounded resource usage
//!
//! Entries are evicted by recency, by an explicit capacity limit, by
//! per-entry TTL, and by host memory pressure. A process-wide
//! [`EvictionScheduler`] keeps relieving memory pressure on caches that see
//! no write traffic.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod scheduler;

pub use api::AppState;
pub use cache::{Cache, CacheConfig, CacheValue};
pub use config::Config;
pub use memory::{MemorySampler, MemoryStatsSource, SysMemStats};
pub use scheduler::{EvictionScheduler, PressureTarget};
