//! Scheduler Module
//!
//! Process-wide background sweep that applies memory-pressure eviction to
//! every registered cache, including caches that see no write traffic.
//!
//! # Caller contract
//! A cache registered here is held by strong reference. Owners must call
//! [`EvictionScheduler::unregister`] before dropping their cache, or it stays
//! alive until the process exits.

mod eviction;

pub use eviction::{EvictionScheduler, PressureTarget, SweepReport, DEFAULT_SWEEP_INTERVAL};
