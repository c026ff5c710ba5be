//! Cache Entry Module
//!
//! Defines individual cache entries, their TTL bookkeeping, and the
//! `CacheValue` trait used to reject empty values at write time.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Value ==
/// A value that can be stored in a [`Cache`](crate::cache::Cache).
///
/// The cache never looks inside a value. The only question it asks is whether
/// the value is "empty", in which case a write is silently dropped.
pub trait CacheValue {
    /// Returns true if this value must not be stored.
    fn is_empty_value(&self) -> bool {
        false
    }
}

impl<T> CacheValue for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl CacheValue for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl CacheValue for &str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> CacheValue for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: ?Sized> CacheValue for Arc<T> {}
impl<T: ?Sized> CacheValue for Box<T> {}

macro_rules! never_empty {
    ($($t:ty),*) => {
        $(impl CacheValue for $t {})*
    };
}

never_empty!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

// == Cache Entry ==
/// A single cache entry: key, opaque value and absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds), 0 = no expiration
    pub expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry written at `now`.
    ///
    /// A zero `ttl` means the entry never expires.
    pub fn new(key: String, value: V, ttl: Duration, now: u64) -> Self {
        Self {
            key,
            value,
            expires_at: expiry_for(ttl, now),
        }
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL from `now`.
    pub fn refresh(&mut self, value: V, ttl: Duration, now: u64) {
        self.value = value;
        self.expires_at = expiry_for(ttl, now);
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// read made exactly when the TTL elapses already misses.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at != 0 && now >= self.expires_at
    }
}

fn expiry_for(ttl: Duration, now: u64) -> u64 {
    match ttl_to_millis(ttl) {
        0 => 0,
        ttl_ms => now.saturating_add(ttl_ms),
    }
}

/// Converts a TTL to whole milliseconds.
///
/// A nonzero TTL below one millisecond rounds up to 1 so it never reads as
/// "no expiry"; durations past `u64::MAX` ms saturate.
pub fn ttl_to_millis(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0 rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), Duration::ZERO, 1_000);

        assert_eq!(entry.value, "v");
        assert_eq!(entry.expires_at, 0);
        assert!(!entry.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("k".to_string(), 7, Duration::from_millis(500), 1_000);

        assert_eq!(entry.expires_at, 1_500);
        assert!(!entry.is_expired_at(1_499));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("k".to_string(), 7, Duration::from_millis(500), 1_000);

        // Expired exactly when insert time + TTL is reached
        assert!(entry.is_expired_at(1_500));
        assert!(entry.is_expired_at(1_501));
    }

    #[test]
    fn test_refresh_restarts_ttl() {
        let mut entry = CacheEntry::new("k".to_string(), 1, Duration::from_millis(100), 1_000);
        entry.refresh(2, Duration::from_millis(100), 5_000);

        assert_eq!(entry.value, 2);
        assert_eq!(entry.expires_at, 5_100);
        assert!(!entry.is_expired_at(5_050));
    }

    #[test]
    fn test_refresh_with_ttl_disabled_clears_expiry() {
        let mut entry = CacheEntry::new("k".to_string(), 1, Duration::from_millis(100), 1_000);
        entry.refresh(1, Duration::ZERO, 5_000);

        assert_eq!(entry.expires_at, 0);
    }

    #[test]
    fn test_sub_millisecond_ttl_still_expires() {
        assert_eq!(ttl_to_millis(Duration::ZERO), 0);
        assert_eq!(ttl_to_millis(Duration::from_micros(500)), 1);
        assert_eq!(ttl_to_millis(Duration::from_nanos(1)), 1);
        assert_eq!(ttl_to_millis(Duration::from_millis(1_500)), 1_500);

        let entry = CacheEntry::new("k".to_string(), 1, Duration::from_micros(500), 1_000);
        assert_eq!(entry.expires_at, 1_001);
        assert!(entry.is_expired_at(1_001));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        assert_eq!(ttl_to_millis(Duration::MAX), u64::MAX);

        let entry = CacheEntry::new("k".to_string(), 1, Duration::MAX, 1_000);
        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired_at(1_000_000));
    }

    #[test]
    fn test_empty_values() {
        assert!(String::new().is_empty_value());
        assert!(!"x".to_string().is_empty_value());
        assert!(None::<u32>.is_empty_value());
        assert!(!Some(0u32).is_empty_value());
        assert!(Vec::<u8>::new().is_empty_value());
        assert!(!0i32.is_empty_value());
        assert!(!Arc::new(String::new()).is_empty_value());
    }
}
