//! Host memory reader backed by `sysinfo`.

use parking_lot::Mutex;
use sysinfo::System;

use super::{MemoryStatsSource, SysMemStats};
use crate::error::MemoryError;

// == System Memory ==
/// Reads physical memory counters for the current host.
pub struct SystemMemory {
    system: Mutex<System>,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStatsSource for SystemMemory {
    fn read(&self) -> Result<SysMemStats, MemoryError> {
        let mut system = self.system.lock();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(MemoryError::Unavailable(
                "host reported zero total memory".to_string(),
            ));
        }
        let free = system.free_memory().min(total);

        Ok(SysMemStats {
            total,
            used: total - free,
            free,
        })
    }
}
