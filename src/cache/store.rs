//! Cache Store Module
//!
//! The cache engine: an [`LruIndex`] behind one mutex, plus the eviction
//! pass that enforces memory pressure, capacity and TTL after every write.
//!
//! TTL is enforced by two cooperating mechanisms. Correctness comes from the
//! lazy check in [`Cache::get`]. The tail sweep in the eviction pass only
//! reclaims expired entries that happen to sit at the LRU end; an expired
//! entry in the middle of the list stays until it is read or aged out by LRU
//! eviction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheConfig, CacheEntry, CacheSettings, CacheStats, CacheValue, LruIndex};
use crate::memory::MemorySampler;
use crate::scheduler::PressureTarget;

/// Share of entries dropped by a memory-pressure event inside `put`.
pub const INLINE_PRESSURE_DIVISOR: usize = 4;

/// Share of entries dropped by a memory-pressure event in a scheduler sweep.
pub const SCHEDULER_PRESSURE_DIVISOR: usize = 3;

/// After an in-line pressure eviction, memory is not re-checked for this
/// long. The OS needs time before freed memory shows up in its counters.
pub const PRESSURE_COOLDOWN: Duration = Duration::from_secs(1);

/// Callback fired once per memory-pressure eviction event.
pub type EvictionHook = Arc<dyn Fn() + Send + Sync>;

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

// == Inner State ==
/// Everything guarded by the cache mutex.
#[derive(Debug)]
struct Inner<V> {
    index: LruIndex<V>,
    stats: CacheStats,
}

impl<V: Clone> Inner<V> {
    /// Writes or refreshes `key` and moves it to the head.
    fn store(&mut self, key: String, value: V, ttl: Duration, now: u64) {
        match self.index.get_mut(&key) {
            Some(entry) => {
                entry.refresh(value, ttl, now);
                self.index.touch(&key);
            }
            None => {
                self.index.push_front(CacheEntry::new(key, value, ttl, now));
            }
        }
        self.stats.set_total_entries(self.index.len());
    }

    /// Lazy TTL check plus recency bump.
    fn lookup(&mut self, key: &str, now: u64) -> Option<V> {
        let expired = match self.index.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.index.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.index.len());
            return None;
        }

        self.index.touch(key);
        self.stats.record_hit();
        self.index.get(key).map(|entry| entry.value.clone())
    }

    /// Drops up to `n` entries from the LRU end.
    fn evict_lru(&mut self, n: usize) -> usize {
        let mut evicted = 0;
        while evicted < n && self.index.pop_back().is_some() {
            evicted += 1;
        }
        self.stats.record_evictions(evicted);
        self.stats.set_total_entries(self.index.len());
        evicted
    }

    /// Pops expired entries off the tail, stopping at the first live one.
    fn sweep_expired_tail(&mut self, now: u64) -> usize {
        let mut expired = 0;
        while self
            .index
            .peek_back()
            .is_some_and(|entry| entry.is_expired_at(now))
        {
            self.index.pop_back();
            expired += 1;
        }
        self.stats.record_expirations(expired);
        self.stats.set_total_entries(self.index.len());
        expired
    }
}

// == Cache ==
/// Thread-safe LRU cache with capacity, TTL and memory-pressure eviction.
///
/// All operations take the cache's single mutex for their whole duration,
/// including any eviction pass they trigger, so operations on one cache are
/// linearizable. Settings live outside that mutex and can be changed at any
/// time; a change is seen by the next operation that reads it.
///
/// If the cache is registered with an
/// [`EvictionScheduler`](crate::scheduler::EvictionScheduler), the owner must
/// unregister it before dropping it. The scheduler holds a strong reference
/// and will otherwise keep the cache alive for the life of the process.
pub struct Cache<V> {
    id: u64,
    inner: Mutex<Inner<V>>,
    settings: CacheSettings,
    memory: Arc<MemorySampler>,
    /// Unix ms before which the in-line memory check is skipped
    pressure_resume_at: AtomicU64,
    on_pressure_eviction: Option<EvictionHook>,
}

impl<V: CacheValue + Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: CacheValue + Clone> Cache<V> {
    // == Constructors ==
    /// Creates a cache with TTL off, no capacity limit and a 10 MiB memory
    /// floor checked against the process-wide sampler.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            inner: Mutex::new(Inner {
                index: LruIndex::new(),
                stats: CacheStats::new(),
            }),
            settings: CacheSettings::new(config),
            memory: MemorySampler::global(),
            pressure_resume_at: AtomicU64::new(0),
            on_pressure_eviction: None,
        }
    }

    /// Installs a callback fired after every memory-pressure eviction.
    pub fn with_eviction_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_pressure_eviction = Some(Arc::new(hook));
        self
    }

    /// Replaces the memory sampler consulted by the pressure check.
    pub fn with_memory_sampler(mut self, sampler: Arc<MemorySampler>) -> Self {
        self.memory = sampler;
        self
    }

    /// Process-unique identifier of this cache.
    pub fn id(&self) -> u64 {
        self.id
    }

    // == Settings ==
    pub fn max_items(&self) -> usize {
        self.settings.max_items()
    }

    /// Sets the entry cap. 0 means unbounded.
    pub fn set_max_items(&self, max_items: usize) {
        self.settings.set_max_items(max_items);
    }

    pub fn min_free_memory(&self) -> u64 {
        self.settings.min_free_memory()
    }

    /// Sets the free memory floor in bytes. 0 disables the pressure check.
    pub fn set_min_free_memory(&self, bytes: u64) {
        self.settings.set_min_free_memory(bytes);
    }

    pub fn default_ttl(&self) -> Duration {
        self.settings.default_ttl()
    }

    /// Sets the TTL given to subsequent writes. Zero disables expiry.
    ///
    /// Entries already stored keep the expiry they were written with.
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.settings.set_default_ttl(ttl);
    }

    pub fn config(&self) -> CacheConfig {
        self.settings.snapshot()
    }

    // == Put ==
    /// Stores `value` under `key` at the head of the recency order.
    ///
    /// An existing entry has its value and TTL refreshed in place. Empty
    /// values are ignored. Runs the eviction pass afterwards.
    pub fn put(&self, key: impl Into<String>, value: V) {
        if value.is_empty_value() {
            return;
        }
        let ttl = self.settings.default_ttl();
        let now = current_timestamp_ms();

        let pressure = {
            let mut inner = self.inner.lock();
            inner.store(key.into(), value, ttl, now);
            self.run_eviction_pass(&mut inner, now)
        };

        if pressure {
            self.notify_pressure_eviction();
        }
    }

    // == Get ==
    /// Returns the value for `key` and makes it the most recently used.
    ///
    /// An entry whose TTL has lapsed is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = current_timestamp_ms();
        self.inner.lock().lookup(key, now)
    }

    // == Get Or Put ==
    /// Returns the live value for `key`, storing `value` first if absent.
    ///
    /// The flag is true when the value was already present. If the key is
    /// absent and `value` is empty, nothing is stored and `(None, false)` is
    /// returned. The whole call runs under the cache lock.
    pub fn get_or_put(&self, key: impl Into<String>, value: V) -> (Option<V>, bool) {
        let key = key.into();
        let ttl = self.settings.default_ttl();
        let now = current_timestamp_ms();

        let pressure = {
            let mut inner = self.inner.lock();
            if let Some(existing) = inner.lookup(&key, now) {
                return (Some(existing), true);
            }
            if value.is_empty_value() {
                return (None, false);
            }
            inner.store(key, value.clone(), ttl, now);
            self.run_eviction_pass(&mut inner, now)
        };

        if pressure {
            self.notify_pressure_eviction();
        }
        (Some(value), false)
    }

    // == Delete ==
    /// Removes `key` if present.
    pub fn del(&self, key: &str) {
        let mut inner = self.inner.lock();
        if inner.index.remove(key).is_some() {
            let len = inner.index.len();
            inner.stats.set_total_entries(len);
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Evict ==
    /// Removes the `n` least recently used entries, or all of them if
    /// fewer remain. Returns how many were removed.
    pub fn evict(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let evicted = self.inner.lock().evict_lru(n);
        debug!(cache_id = self.id, evicted, "Explicit eviction");
        evicted
    }

    // == Inspection ==
    /// Checks for `key` without changing recency or expiring it.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().index.contains(key)
    }

    /// Returns a live value without changing recency.
    pub fn peek(&self, key: &str) -> Option<V> {
        let now = current_timestamp_ms();
        let inner = self.inner.lock();
        inner
            .index
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().index.keys().map(str::to_string).collect()
    }

    /// Removes every entry. Not counted as eviction.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.index.clear();
        inner.stats.set_total_entries(0);
    }

    /// Size of the key map, checked against the list length in tests.
    #[cfg(test)]
    pub(crate) fn lookup_len(&self) -> usize {
        self.inner.lock().index.lookup_len()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.index.len());
        stats
    }

    // == Eviction Pass ==
    /// Applies memory pressure, capacity and TTL policies, in that order.
    ///
    /// Called with the cache lock held. Returns true if a memory-pressure
    /// event fired, so the caller can notify the hook after unlocking.
    fn run_eviction_pass(&self, inner: &mut Inner<V>, now: u64) -> bool {
        let pressure = self.relieve_inline_pressure(inner, now);

        let max_items = self.settings.max_items();
        let len = inner.index.len();
        if max_items > 0 && len > max_items {
            let evicted = inner.evict_lru(len - max_items);
            debug!(cache_id = self.id, evicted, max_items, "Capacity eviction");
        }

        if !self.settings.default_ttl().is_zero() {
            let expired = inner.sweep_expired_tail(now);
            if expired > 0 {
                debug!(cache_id = self.id, expired, "Expired entries swept from tail");
            }
        }

        pressure
    }

    fn relieve_inline_pressure(&self, inner: &mut Inner<V>, now: u64) -> bool {
        let floor = self.settings.min_free_memory();
        if floor == 0 || now < self.pressure_resume_at.load(Ordering::Acquire) {
            return false;
        }

        // A failed sample was already logged by the sampler; skip this pass.
        let Ok(stats) = self.memory.sample() else {
            return false;
        };
        if stats.free >= floor {
            return false;
        }

        let target = inner.index.len() / INLINE_PRESSURE_DIVISOR;
        let evicted = inner.evict_lru(target);
        inner.stats.record_pressure_event();
        let cooldown_ms = PRESSURE_COOLDOWN.as_millis() as u64;
        self.pressure_resume_at
            .store(now.saturating_add(cooldown_ms), Ordering::Release);

        info!(
            cache_id = self.id,
            evicted,
            free = stats.free,
            floor,
            "Memory pressure eviction"
        );
        true
    }

    fn notify_pressure_eviction(&self) {
        if let Some(hook) = &self.on_pressure_eviction {
            hook();
        }
    }
}

// == Scheduler Integration ==
impl<V: CacheValue + Clone + Send> PressureTarget for Cache<V> {
    fn id(&self) -> u64 {
        self.id
    }

    fn relieve_pressure(&self, free_memory: u64) -> usize {
        let floor = self.settings.min_free_memory();
        if floor == 0 || free_memory >= floor {
            return 0;
        }

        let evicted = {
            let mut inner = self.inner.lock();
            let target = inner.index.len() / SCHEDULER_PRESSURE_DIVISOR;
            let evicted = inner.evict_lru(target);
            inner.stats.record_pressure_event();
            evicted
        };
        info!(
            cache_id = self.id,
            evicted,
            free = free_memory,
            floor,
            "Scheduled memory pressure eviction"
        );

        self.notify_pressure_eviction();
        evicted
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoryError;
    use crate::memory::SysMemStats;
    use crate::scheduler::EvictionScheduler;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{OnceLock, Weak};
    use std::thread;
    use std::thread::sleep;

    /// Sampler reporting whatever free memory the test stores in `free`.
    fn fake_sampler(free: Arc<AtomicU64>) -> Arc<MemorySampler> {
        let sampler = MemorySampler::new(move || -> Result<SysMemStats, MemoryError> {
            let free = free.load(Ordering::SeqCst);
            Ok(SysMemStats {
                total: 1 << 40,
                used: (1 << 40) - free,
                free,
            })
        });
        Arc::new(sampler.with_refresh_interval(Duration::ZERO))
    }

    /// Cache whose memory check never fires.
    fn plain_cache<V: CacheValue + Clone>() -> Cache<V> {
        Cache::with_config(CacheConfig {
            min_free_memory: 0,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn test_cache_new_defaults() {
        let cache: Cache<u32> = Cache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.max_items(), 0);
        assert_eq!(cache.default_ttl(), Duration::ZERO);
        assert_eq!(cache.min_free_memory(), crate::cache::DEFAULT_MIN_FREE_MEMORY);
    }

    #[test]
    fn test_cache_ids_are_unique() {
        let a: Cache<u32> = Cache::new();
        let b: Cache<u32> = Cache::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_recency_lifecycle_scenario() {
        let cache = plain_cache::<i32>();

        for i in (1..=10).rev() {
            let k = i.to_string();
            cache.put(k.clone(), i);
            assert_eq!(cache.keys()[0], k);
        }
        assert_eq!(cache.len(), 10);

        // Put overwrites items with the same key
        cache.put("1", 1);
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.lookup_len(), 10);

        cache.del("10");
        cache.del("9");
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get("10"), None);
        assert_eq!(cache.get("9"), None);

        // Get pushes to the front
        assert_eq!(cache.get("2"), Some(2));
        assert_eq!(cache.keys()[0], "2");

        // Evict half
        assert_eq!(cache.evict(cache.len() / 2), 4);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.lookup_len(), 4);
        assert_eq!(cache.get("4"), Some(4));
        assert_eq!(cache.get("5"), None);

        // Evict all
        assert_eq!(cache.evict(cache.len()), 4);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.lookup_len(), 0);
    }

    #[test]
    fn test_max_items_scenario() {
        let cache = plain_cache::<&str>();
        cache.set_max_items(2);

        cache.put("a", "1");
        assert_eq!(cache.len(), 1);
        cache.put("b", "2");
        assert_eq!(cache.len(), 2);
        cache.put("c", "3");
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_max_items_one_is_enforced() {
        let cache = plain_cache::<u32>();
        cache.set_max_items(1);

        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn test_lowering_max_items_applies_on_next_put() {
        let cache = plain_cache::<u32>();
        for i in 0..10u32 {
            cache.put(i.to_string(), i);
        }

        cache.set_max_items(3);
        assert_eq!(cache.len(), 10);

        cache.put("new", 99);
        assert_eq!(cache.keys(), vec!["new", "9", "8"]);
    }

    #[test]
    fn test_empty_value_is_ignored() {
        let cache = plain_cache::<String>();

        cache.put("k", String::new());
        assert!(cache.is_empty());

        cache.put("k", "v".to_string());
        cache.put("k", String::new());
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_option_none_is_ignored() {
        let cache = plain_cache::<Option<u32>>();
        cache.put("k", None);
        assert!(cache.is_empty());
        cache.put("k", Some(0));
        assert_eq!(cache.get("k"), Some(Some(0)));
    }

    #[test]
    fn test_put_existing_moves_to_front_and_refreshes() {
        let cache = plain_cache::<u32>();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 3);

        assert_eq!(cache.keys(), vec!["a", "b"]);
        assert_eq!(cache.peek("a"), Some(3));
    }

    #[test]
    fn test_get_missing() {
        let cache = plain_cache::<u32>();
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_del_is_idempotent() {
        let cache = plain_cache::<u32>();
        cache.put("a", 1);
        cache.put("b", 2);

        cache.del("a");
        let after_first = (cache.keys(), cache.len());
        cache.del("a");

        assert_eq!((cache.keys(), cache.len()), after_first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_more_than_len_and_zero() {
        let cache = plain_cache::<u32>();
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.evict(0), 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.evict(10), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_evict_takes_from_tail() {
        let cache = plain_cache::<u32>();
        for k in ["a", "b", "c", "d"] {
            cache.put(k, 1);
        }
        cache.get("a");

        cache.evict(2);
        assert_eq!(cache.keys(), vec!["a", "d"]);
    }

    #[test]
    fn test_ttl_expiry_is_lazy_on_get() {
        let cache = plain_cache::<u32>();
        cache.set_default_ttl(Duration::from_millis(50));

        cache.put("k", 1);
        assert_eq!(cache.get("k"), Some(1));

        sleep(Duration::from_millis(80));

        // Still physically stored until something touches it
        assert!(cache.contains("k"));
        assert_eq!(cache.peek("k"), None);
        assert_eq!(cache.get("k"), None);
        assert!(!cache.contains("k"));

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_put_refreshes_ttl() {
        let cache = plain_cache::<u32>();
        cache.set_default_ttl(Duration::from_millis(150));

        cache.put("k", 1);
        sleep(Duration::from_millis(100));
        cache.put("k", 2);
        sleep(Duration::from_millis(100));

        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_ttl_change_is_not_retroactive() {
        let cache = plain_cache::<u32>();
        cache.put("forever", 1);

        cache.set_default_ttl(Duration::from_millis(20));
        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("forever"), Some(1));
    }

    #[test]
    fn test_tail_sweep_stops_at_first_live_entry() {
        let cache = plain_cache::<u32>();
        cache.set_default_ttl(Duration::from_millis(40));

        cache.put("old1", 1);
        cache.put("old2", 2);
        sleep(Duration::from_millis(60));

        // "old1" is refreshed to the head, leaving "old2" expired at the tail
        cache.set_default_ttl(Duration::from_secs(60));
        cache.put("old1", 1);
        cache.put("fresh", 3);

        assert_eq!(cache.keys(), vec!["fresh", "old1"]);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_tail_sweep_leaves_interior_expired_entries() {
        let cache = plain_cache::<u32>();
        cache.set_default_ttl(Duration::from_secs(60));
        cache.put("live_tail", 1);

        cache.set_default_ttl(Duration::from_millis(20));
        cache.put("interior", 2);
        sleep(Duration::from_millis(40));

        cache.set_default_ttl(Duration::from_secs(60));
        cache.put("head", 3);

        // The interior entry is only reclaimed by a read
        assert!(cache.contains("interior"));
        assert_eq!(cache.get("interior"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_or_put() {
        let cache = plain_cache::<String>();

        assert_eq!(
            cache.get_or_put("k", "first".to_string()),
            (Some("first".to_string()), false)
        );
        assert_eq!(
            cache.get_or_put("k", "second".to_string()),
            (Some("first".to_string()), true)
        );
        assert_eq!(cache.get_or_put("other", String::new()), (None, false));
        assert!(!cache.contains("other"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_put_is_atomic() {
        let cache = Arc::new(plain_cache::<usize>());
        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || cache.get_or_put("shared", i))
            })
            .collect();

        let results: Vec<(Option<usize>, bool)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = results.iter().filter(|(_, loaded)| !loaded).count();
        assert_eq!(winners, 1);
        let stored = cache.get("shared");
        assert!(results.iter().all(|(v, _)| *v == stored));
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(plain_cache::<usize>());
        cache.set_max_items(16);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        cache.put(format!("{}-{}", t, i), i + 1);
                        assert!(cache.len() <= 16);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cache.len(), 16);
        assert_eq!(cache.keys().len(), 16);
    }

    #[test]
    fn test_memory_pressure_evicts_quarter_and_notifies() {
        let free = Arc::new(AtomicU64::new(1 << 30));
        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        let cache = Cache::with_config(CacheConfig {
            min_free_memory: 1 << 20,
            ..CacheConfig::default()
        })
        .with_memory_sampler(fake_sampler(free.clone()))
        .with_eviction_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for i in 0..19u32 {
            cache.put(i.to_string(), i);
        }
        assert_eq!(cache.len(), 19);
        assert_eq!(events.load(Ordering::SeqCst), 0);

        // 20 entries after insert, a quarter of them go
        free.store(1024, Ordering::SeqCst);
        cache.put("19", 19);
        assert_eq!(cache.len(), 15);
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert!(!cache.contains("0"));
        assert!(!cache.contains("4"));
        assert!(cache.contains("5"));

        let stats = cache.stats();
        assert_eq!(stats.pressure_events, 1);
        assert_eq!(stats.evictions, 5);
    }

    #[test]
    fn test_hook_can_read_cache_during_pressure_eviction() {
        let free = Arc::new(AtomicU64::new(1 << 30));
        let slot: Arc<OnceLock<Weak<Cache<u32>>>> = Arc::new(OnceLock::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let hook_slot = slot.clone();
        let hook_seen = seen.clone();
        let cache = Arc::new(
            Cache::with_config(CacheConfig {
                min_free_memory: 1 << 20,
                ..CacheConfig::default()
            })
            .with_memory_sampler(fake_sampler(free.clone()))
            .with_eviction_hook(move || {
                // Would deadlock if the cache lock were still held
                if let Some(cache) = hook_slot.get().and_then(Weak::upgrade) {
                    hook_seen.lock().push(cache.len());
                }
            }),
        );
        assert!(slot.set(Arc::downgrade(&cache)).is_ok());

        for i in 0..7u32 {
            cache.put(i.to_string(), i);
        }

        // In-line: 8 entries, a quarter go
        free.store(0, Ordering::SeqCst);
        cache.put("7", 7);
        assert_eq!(*seen.lock(), vec![6]);

        // Scheduler: 6 entries, a third go
        let scheduler = EvictionScheduler::new(fake_sampler(free), Duration::from_secs(3600));
        scheduler.register(cache.clone());
        assert_eq!(scheduler.sweep().entries_evicted, 2);
        scheduler.unregister(cache.as_ref());

        assert_eq!(*seen.lock(), vec![6, 4]);
    }

    #[test]
    fn test_memory_pressure_cooldown() {
        let free = Arc::new(AtomicU64::new(0));
        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        let cache = Cache::with_config(CacheConfig {
            min_free_memory: 1 << 20,
            ..CacheConfig::default()
        })
        .with_memory_sampler(fake_sampler(free))
        .with_eviction_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for i in 0..8u32 {
            cache.put(i.to_string(), i);
        }

        // Only the first put under pressure fires (a quarter of one entry is
        // nothing); the rest fall inside the cooldown
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 8);

        sleep(PRESSURE_COOLDOWN + Duration::from_millis(50));
        cache.put("after", 1);
        assert_eq!(events.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn test_memory_check_disabled_with_zero_floor() {
        let free = Arc::new(AtomicU64::new(0));
        let cache = plain_cache::<u32>().with_memory_sampler(fake_sampler(free));

        for i in 0..10u32 {
            cache.put(i.to_string(), i);
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.stats().pressure_events, 0);
    }

    #[test]
    fn test_memory_sample_failure_skips_pressure_check() {
        let sampler = MemorySampler::new(|| -> Result<SysMemStats, MemoryError> {
            Err(MemoryError::Unavailable("no counters".to_string()))
        });
        let cache = Cache::with_config(CacheConfig {
            max_items: 3,
            min_free_memory: u64::MAX,
            default_ttl_ms: 0,
        })
        .with_memory_sampler(Arc::new(sampler));

        for i in 0..10u32 {
            cache.put(i.to_string(), i);
        }

        // Capacity still enforced, no pressure event recorded
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().pressure_events, 0);
    }

    #[test]
    fn test_relieve_pressure_evicts_third() {
        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        let cache = Cache::with_config(CacheConfig {
            min_free_memory: 1000,
            ..CacheConfig::default()
        })
        .with_memory_sampler(fake_sampler(Arc::new(AtomicU64::new(u64::MAX))))
        .with_eviction_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        for i in 0..9u32 {
            cache.put(i.to_string(), i);
        }

        assert_eq!(cache.relieve_pressure(5000), 0);
        assert_eq!(cache.relieve_pressure(999), 3);
        assert_eq!(cache.len(), 6);
        assert_eq!(events.load(Ordering::SeqCst), 1);

        cache.set_min_free_memory(0);
        assert_eq!(cache.relieve_pressure(0), 0);
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = plain_cache::<u32>();
        cache.put("a", 1);
        cache.get("a");
        cache.get("b");
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 0);
        assert!(cache.keys().is_empty());
    }
}
