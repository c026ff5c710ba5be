//! Eviction Scheduler
//!
//! Wakes on a fixed interval, samples host memory once, and asks every
//! registered cache to relieve pressure if free memory is below its floor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::memory::MemorySampler;

/// Time between two sweeps of the process-wide scheduler.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

static GLOBAL_SCHEDULER: OnceLock<Arc<EvictionScheduler>> = OnceLock::new();

// == Pressure Target ==
/// A cache the scheduler can push memory-pressure eviction into.
pub trait PressureTarget: Send + Sync {
    /// Process-unique identifier used as the registry key.
    fn id(&self) -> u64;

    /// Evicts if `free_memory` is below this target's floor.
    ///
    /// Returns the number of entries removed.
    fn relieve_pressure(&self, free_memory: u64) -> usize;
}

// == Sweep Report ==
/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub caches_visited: usize,
    pub entries_evicted: usize,
}

// == Eviction Scheduler ==
/// Registry of caches plus the background loop that sweeps them.
///
/// Caches are visited in no particular order and independently of each
/// other. A cache unregistered while a sweep is running may still be visited
/// by that sweep.
pub struct EvictionScheduler {
    sampler: Arc<MemorySampler>,
    interval: Duration,
    started: AtomicBool,
    caches: Mutex<HashMap<u64, Arc<dyn PressureTarget>>>,
}

impl EvictionScheduler {
    // == Constructors ==
    /// Creates a standalone scheduler. Nothing runs until [`start`](Self::start).
    pub fn new(sampler: Arc<MemorySampler>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            sampler,
            interval,
            started: AtomicBool::new(false),
            caches: Mutex::new(HashMap::new()),
        })
    }

    /// The process-wide scheduler, sweeping every five seconds against the
    /// process-wide memory sampler.
    pub fn global() -> Arc<Self> {
        GLOBAL_SCHEDULER
            .get_or_init(|| Self::new(MemorySampler::global(), DEFAULT_SWEEP_INTERVAL))
            .clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    // == Start ==
    /// Spawns the sweep loop once; later calls do nothing.
    ///
    /// The loop runs on a dedicated thread until process exit, independent of
    /// any tokio runtime the caller happens to be inside. Sweeps take
    /// blocking locks and query the OS, so they stay off async workers.
    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::AcqRel) {
            return;
        }

        let scheduler = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("cache-eviction-scheduler".to_string())
            .spawn(move || {
                info!(
                    "Starting eviction scheduler thread with interval of {:?}",
                    scheduler.interval
                );
                loop {
                    std::thread::sleep(scheduler.interval);
                    scheduler.sweep();
                }
            });
        if let Err(e) = spawned {
            warn!("Failed to spawn eviction scheduler thread: {}", e);
            self.started.store(false, Ordering::Release);
        }
    }

    // == Registration ==
    /// Adds `target` to the sweep and starts the scheduler if needed.
    ///
    /// Returns false if a target with the same id was already registered.
    pub fn register<T: PressureTarget + 'static>(self: &Arc<Self>, target: Arc<T>) -> bool {
        let id = target.id();
        let added = self.caches.lock().insert(id, target).is_none();
        if added {
            debug!(cache_id = id, "Cache registered with eviction scheduler");
        }
        self.start();
        added
    }

    /// Removes `target` from the sweep. Returns false if it was not registered.
    pub fn unregister<T: PressureTarget + ?Sized>(&self, target: &T) -> bool {
        self.unregister_id(target.id())
    }

    pub fn unregister_id(&self, id: u64) -> bool {
        let removed = self.caches.lock().remove(&id).is_some();
        if removed {
            debug!(cache_id = id, "Cache unregistered from eviction scheduler");
        }
        removed
    }

    pub fn is_registered(&self, id: u64) -> bool {
        self.caches.lock().contains_key(&id)
    }

    pub fn registered_count(&self) -> usize {
        self.caches.lock().len()
    }

    // == Sweep ==
    /// Runs one tick: a single memory sample, then every registered cache.
    ///
    /// A failed sample skips the whole tick; registrations are kept.
    pub fn sweep(&self) -> SweepReport {
        let stats = match self.sampler.sample() {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Skipping eviction sweep: {}", e);
                return SweepReport::default();
            }
        };

        // Caches are relieved outside the registry lock so hooks may
        // register or unregister without deadlocking.
        let targets: Vec<Arc<dyn PressureTarget>> = self.caches.lock().values().cloned().collect();

        let mut report = SweepReport::default();
        for target in targets {
            report.caches_visited += 1;
            report.entries_evicted += target.relieve_pressure(stats.free);
        }

        if report.entries_evicted > 0 {
            info!(
                "Eviction sweep: evicted {} entries across {} caches (free={})",
                report.entries_evicted, report.caches_visited, stats.free
            );
        } else {
            debug!(
                "Eviction sweep: nothing to evict across {} caches",
                report.caches_visited
            );
        }
        report
    }
}
