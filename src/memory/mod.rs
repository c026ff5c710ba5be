//! Memory Module
//!
//! Host memory statistics consumed by memory-pressure eviction.
//!
//! The OS query lives behind [`MemoryStatsSource`]; [`MemorySampler`] wraps a
//! source and rate-limits how often it is actually asked.

mod sampler;
mod system;

pub use sampler::{MemorySampler, DEFAULT_REFRESH_INTERVAL};
pub use system::SystemMemory;

use serde::Serialize;

use crate::error::MemoryError;

// == Sys Mem Stats ==
/// Host memory reading, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SysMemStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

// == Memory Stats Source ==
/// Something that can read host memory statistics.
///
/// Failures are expected and never fatal: callers skip the memory check for
/// that pass.
pub trait MemoryStatsSource: Send + Sync {
    fn read(&self) -> Result<SysMemStats, MemoryError>;
}

impl<F> MemoryStatsSource for F
where
    F: Fn() -> Result<SysMemStats, MemoryError> + Send + Sync,
{
    fn read(&self) -> Result<SysMemStats, MemoryError> {
        self()
    }
}
