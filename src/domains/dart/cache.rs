//! Bounded TTL cache with least-recently-used eviction, backed by moka.
//!
//! Each entry carries the TTL chosen by the caller at insert time. Expired
//! entries read as absent immediately and are physically dropped by moka's
//! maintenance, which runs after every write so the capacity bound holds when
//! `put` returns. A full cache drops expired entries before evicting the
//! least-recently-used live one.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::debug;

#[derive(Clone)]
struct Stored<V> {
    value: V,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with. A rewrite restarts the clock.
struct WriteTtl;

impl<V> Expiry<String, Stored<V>> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Stored<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Stored<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe TTL cache keyed by strings.
///
/// The TTL is chosen per insert by the caller; the cache itself is agnostic to it.
pub struct TtlCache<V> {
    inner: Cache<String, Stored<V>>,
    capacity: usize,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let inner = Cache::builder()
            .max_capacity(capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(WriteTtl)
            .build();
        Self { inner, capacity }
    }

    /// Look up a live entry, refreshing its recency.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|stored| stored.value)
    }

    /// Insert or wholesale replace an entry.
    ///
    /// A zero TTL stores nothing.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let key = key.into();
        debug!("Cache store | key={}, ttl={:?}", key, ttl);
        self.inner.insert(key, Stored { value, ttl });
        self.inner.run_pending_tasks();
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let removed = self.inner.remove(key).map(|stored| stored.value);
        self.inner.run_pending_tasks();
        removed
    }

    pub fn clear(&self) {
        for (key, _) in self.inner.iter() {
            self.inner.invalidate(key.as_str());
        }
        self.inner.run_pending_tasks();
    }

    /// Physically remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.inner.entry_count();
        self.inner.run_pending_tasks();
        before.saturating_sub(self.inner.entry_count()) as usize
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::sleep;

    const HOUR: Duration = Duration::from_secs(3600);
    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new(4);
        cache.put("k", 1, Duration::from_millis(300));
        assert_eq!(cache.get("k"), Some(1));

        sleep(Duration::from_millis(400));
        assert_eq!(cache.get("k"), None);
        cache.purge_expired();
        assert!(cache.is_empty(), "expired entry is dropped by maintenance");
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = TtlCache::new(3);
        cache.put("a", 1, HOUR);
        cache.put("b", 2, HOUR);
        cache.put("c", 3, HOUR);

        // "a" becomes the most recent; "b" is now the oldest.
        assert_eq!(cache.get("a"), Some(1));
        cache.put("d", 4, HOUR);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.get("d"), Some(4));
    }

    #[test]
    fn test_full_cache_drops_expired_before_live() {
        let cache = TtlCache::new(3);
        cache.put("old", 1, HOUR);
        cache.put("short", 2, SHORT);
        cache.put("new", 3, HOUR);

        sleep(SHORT * 3);
        cache.put("extra", 4, HOUR);

        assert_eq!(cache.get("old"), Some(1), "live LRU entry survives");
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("new"), Some(3));
        assert_eq!(cache.get("extra"), Some(4));
    }

    #[test]
    fn test_overwrite_replaces_value_and_deadline() {
        let cache = TtlCache::new(2);
        cache.put("k", 1, SHORT);
        cache.put("k", 2, HOUR);
        assert_eq!(cache.len(), 1);

        sleep(SHORT * 3);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let cache = TtlCache::new(10);
        cache.put("a", 1, SHORT);
        cache.put("b", 2, SHORT);
        cache.put("c", 3, HOUR);

        sleep(SHORT * 3);
        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_and_clear() {
        let cache = TtlCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put("a", 1, Duration::ZERO);
        assert!(cache.is_empty());

        cache.put("a", 1, HOUR);
        assert_eq!(cache.remove("a"), Some(1));
        cache.put("b", 2, HOUR);
        cache.clear();
        assert!(cache.get("b").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(TtlCache::new(64));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("{}-{}", t, i % 16);
                        cache.put(key.clone(), i, HOUR);
                        cache.get(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        cache.purge_expired();
        assert!(cache.len() <= 64);
    }
}
