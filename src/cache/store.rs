//! Key/value storage behind the timed cache.
//!
//! Values are opaque byte strings; the timed cache owns their encoding. A
//! store may drop entries whenever it needs room, which readers observe as an
//! ordinary miss.

use std::sync::RwLock;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_EVICT: &str = "vellum_cache_evict_total";

/// Shared key/value storage. Implementations must be safe under concurrent
/// `get`/`set`/`flush_all`, and replace values whole.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores `value`, overwriting any prior entry. Best effort.
    fn set(&self, key: &str, value: Bytes);

    fn delete(&self, key: &str);

    fn flush_all(&self);
}

/// In-process store with least-recently-used eviction.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, Bytes>>,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.store_capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        // LRU reads reorder entries, so even lookups take the write lock.
        rw_write(&self.entries, SOURCE, "get").get(key).cloned()
    }

    fn set(&self, key: &str, value: Bytes) {
        let displaced = rw_write(&self.entries, SOURCE, "set").push(key.to_string(), value);
        if let Some((evicted, _)) = displaced
            && evicted != key
        {
            counter!(METRIC_CACHE_EVICT).increment(1);
            debug!(evicted_key = %evicted, "cache entry evicted for capacity");
        }
    }

    fn delete(&self, key: &str) {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
    }

    fn flush_all(&self) {
        rw_write(&self.entries, SOURCE, "flush_all").clear();
    }
}
