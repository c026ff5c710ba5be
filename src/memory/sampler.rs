//! Rate-limited memory sampling.
//!
//! Every cache in the process shares one sampler, so a burst of eviction
//! passes triggers at most one OS query per refresh interval.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{MemoryStatsSource, SysMemStats, SystemMemory};
use crate::error::MemoryError;

/// Minimum age of a reading before the source is asked again.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

static GLOBAL_SAMPLER: OnceLock<Arc<MemorySampler>> = OnceLock::new();

// == Memory Sampler ==
/// Caches the latest successful reading of a [`MemoryStatsSource`].
pub struct MemorySampler {
    source: Box<dyn MemoryStatsSource>,
    refresh_interval: Duration,
    last: Mutex<Option<(Instant, SysMemStats)>>,
}

impl MemorySampler {
    // == Constructor ==
    pub fn new(source: impl MemoryStatsSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            last: Mutex::new(None),
        }
    }

    /// Overrides the refresh interval. `Duration::ZERO` reads on every call.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    // == Global ==
    /// The process-wide sampler reading the host through [`SystemMemory`].
    pub fn global() -> Arc<MemorySampler> {
        GLOBAL_SAMPLER
            .get_or_init(|| Arc::new(MemorySampler::new(SystemMemory::new())))
            .clone()
    }

    // == Sample ==
    /// Returns a reading no older than the refresh interval.
    ///
    /// Failed reads are not cached, so the next call retries the source.
    pub fn sample(&self) -> Result<SysMemStats, MemoryError> {
        let mut last = self.last.lock();
        if let Some((read_at, stats)) = *last {
            if read_at.elapsed() < self.refresh_interval {
                return Ok(stats);
            }
        }

        match self.source.read() {
            Ok(stats) => {
                debug!(
                    "Memory sample: total={} used={} free={}",
                    stats.total, stats.used, stats.free
                );
                *last = Some((Instant::now(), stats));
                Ok(stats)
            }
            Err(e) => {
                warn!("Failed to read system memory stats: {}", e);
                Err(e)
            }
        }
    }

    /// Drops the cached reading so the next `sample` hits the source.
    pub fn invalidate(&self) {
        *self.last.lock() = None;
    }
}
