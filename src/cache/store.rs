//! Cache Store Module
//!
//! TTL-keyed associative store with lazy expiry on access and an eager
//! bulk sweep.

use std::collections::HashMap;
use std::time::Instant;

use crate::cache::{CacheEntry, CacheStats, Expiry, Ttl};
use crate::error::Result;

// == Entry Snapshot ==
/// A copy of a live entry together with its expiry deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot<V> {
    pub value: V,
    pub expires_at: Expiry,
}

// == Cache ==
/// In-memory TTL cache.
///
/// Values handed out are clones; the stored entries never leave the cache.
#[derive(Debug)]
pub struct Cache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Lookup statistics
    stats: CacheStats,
    /// TTL applied by `set`
    default_ttl: Ttl,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_ttl` - Lifetime applied by `set`
    ///
    /// # Errors
    /// `InvalidTtl` if `default_ttl` is zero.
    pub fn new(default_ttl: Ttl) -> Result<Self> {
        Ok(Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl: default_ttl.validate()?,
        })
    }

    /// TTL applied by `set`.
    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    // == Set ==
    /// Stores `value` under `key` with the default TTL, replacing any
    /// existing entry. Returns the stored value.
    ///
    /// # Arguments
    /// * `key` - Entry key, any string
    /// * `value` - Value to store; a clone is returned
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<V> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Stores `value` under `key` with an explicit TTL.
    ///
    /// # Arguments
    /// * `key` - Entry key, any string
    /// * `value` - Value to store; a clone is returned
    /// * `ttl` - Lifetime of this entry, measured from now
    ///
    /// # Errors
    /// `InvalidTtl` if `ttl` is zero. The cache is left untouched.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<V> {
        let ttl = ttl.validate()?;
        let entry = CacheEntry::new(value.clone(), ttl, Instant::now());
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
        Ok(value)
    }

    // == Get ==
    /// Returns the value for `key` if present and fresh.
    ///
    /// An expired entry is removed as a side effect.
    ///
    /// # Arguments
    /// * `key` - Key to look up
    ///
    /// # Returns
    /// A clone of the stored value, or `None` on a miss
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_with_metadata(key).map(|snapshot| snapshot.value)
    }

    /// Same freshness rules as `get`, also exposing the expiry deadline.
    ///
    /// Counts as a lookup: hits and misses are recorded in the stats.
    pub fn get_with_metadata(&mut self, key: &str) -> Option<EntrySnapshot<V>> {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| EntrySnapshot {
            value: entry.value.clone(),
            expires_at: entry.expires_at,
        })
    }

    // == Has ==
    /// True iff `get(key)` would return a value.
    pub fn has(&mut self, key: &str) -> bool {
        self.get_with_metadata(key).is_some()
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    ///
    /// # Arguments
    /// * `key` - Key to remove; an expired entry still counts as present
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Drops every entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Prune Expired ==
    /// Removes all entries expired as of a single clock reading.
    ///
    /// Returns the number of entries removed.
    pub fn prune_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Snapshot of the counters with the current entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of entries physically held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use std::thread::sleep;
    use std::time::Duration;

    fn cache() -> Cache<String> {
        Cache::new(Ttl::from_millis(1_000)).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_default_ttl() {
        let result = Cache::<String>::new(Ttl::Finite(Duration::ZERO));
        assert!(matches!(result, Err(ProxyError::InvalidTtl)));
    }

    #[test]
    fn test_new_accepts_infinite_default_ttl() {
        let store = Cache::<String>::new(Ttl::Infinite).unwrap();
        assert_eq!(store.default_ttl(), Ttl::Infinite);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = cache();

        let stored = store.set("foo", "bar".to_string()).unwrap();
        assert_eq!(stored, "bar");
        assert_eq!(store.get("foo"), Some("bar".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let mut store = cache();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_set_with_zero_ttl_fails() {
        let mut store = cache();

        let result = store.set_with_ttl("k", "v".to_string(), Ttl::Finite(Duration::ZERO));
        assert!(matches!(result, Err(ProxyError::InvalidTtl)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let mut store = cache();

        store.set("k", "v1".to_string()).unwrap();
        store.set("k", "v2".to_string()).unwrap();

        assert_eq!(store.get("k"), Some("v2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ttl_expiration_evicts_lazily() {
        let mut store = cache();

        store
            .set_with_ttl("k", "v".to_string(), Ttl::from_millis(50))
            .unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));

        sleep(Duration::from_millis(80));

        // Still physically present until touched
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_infinite_ttl_survives() {
        let mut store = Cache::new(Ttl::from_millis(10)).unwrap();

        store
            .set_with_ttl("forever", "v".to_string(), Ttl::Infinite)
            .unwrap();
        sleep(Duration::from_millis(30));

        assert_eq!(store.get("forever"), Some("v".to_string()));
    }

    #[test]
    fn test_get_with_metadata() {
        let mut store = cache();

        store.set("k", "v".to_string()).unwrap();
        let snapshot = store.get_with_metadata("k").unwrap();
        assert_eq!(snapshot.value, "v");
        assert!(matches!(snapshot.expires_at, Expiry::At(_)));

        store.set_with_ttl("inf", "v".to_string(), Ttl::Infinite).unwrap();
        let snapshot = store.get_with_metadata("inf").unwrap();
        assert_eq!(snapshot.expires_at, Expiry::Never);
    }

    #[test]
    fn test_get_with_metadata_evicts_expired() {
        let mut store = cache();

        store
            .set_with_ttl("k", "v".to_string(), Ttl::from_millis(20))
            .unwrap();
        sleep(Duration::from_millis(40));

        assert!(store.get_with_metadata("k").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_has_uses_freshness() {
        let mut store = cache();

        store
            .set_with_ttl("k", "v".to_string(), Ttl::from_millis(20))
            .unwrap();
        assert!(store.has("k"));

        sleep(Duration::from_millis(40));
        assert!(!store.has("k"));
    }

    #[test]
    fn test_delete() {
        let mut store = cache();

        store.set("k", "v".to_string()).unwrap();
        assert!(store.delete("k"));
        assert!(!store.has("k"));
        assert!(!store.delete("k"));
    }

    #[test]
    fn test_clear() {
        let mut store = cache();

        store.set("a", "1".to_string()).unwrap();
        store.set_with_ttl("b", "2".to_string(), Ttl::Infinite).unwrap();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_prune_expired() {
        let mut store = cache();

        store
            .set_with_ttl("short", "1".to_string(), Ttl::from_millis(20))
            .unwrap();
        store
            .set_with_ttl("long", "2".to_string(), Ttl::from_millis(10_000))
            .unwrap();
        store
            .set_with_ttl("forever", "3".to_string(), Ttl::Infinite)
            .unwrap();

        sleep(Duration::from_millis(40));

        assert_eq!(store.prune_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.has("long"));
        assert!(store.has("forever"));
        assert_eq!(store.prune_expired(), 0);
    }

    #[test]
    fn test_stats() {
        let mut store = cache();

        store.set("k", "v".to_string()).unwrap();
        store.get("k");
        store.get("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
