//! Values stamped with their write time, read back together with their age.
//!
//! There is no expiry: an entry stays servable until it is overwritten,
//! flushed or evicted. The age is reported so the caller can decide what
//! staleness means.

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::store::KeyValueStore;

pub(crate) const METRIC_CACHE_HIT: &str = "vellum_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "vellum_cache_miss_total";

/// Outcome of a cache read.
///
/// A miss is its own variant; it is never reported as a zero-age hit.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    Hit { value: V, age: Duration },
    Miss,
}

impl<V> CacheLookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn age(&self) -> Option<Duration> {
        match self {
            Self::Hit { age, .. } => Some(*age),
            Self::Miss => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Hit { value, .. } => Some(value),
            Self::Miss => None,
        }
    }
}

#[derive(Serialize)]
struct EntryRef<'a, V> {
    value: &'a V,
    stored_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct Entry<V> {
    value: V,
    stored_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct TimedCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TimedCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stores `value` stamped with the current time, replacing any prior entry.
    ///
    /// An unencodable value is logged and dropped; the next read misses.
    pub fn set<V: Serialize>(&self, key: &str, value: &V) {
        let entry = EntryRef {
            value,
            stored_at: self.clock.now(),
        };
        match serde_json::to_vec(&entry) {
            Ok(encoded) => self.store.set(key, Bytes::from(encoded)),
            Err(err) => {
                warn!(key, error = %err, "failed to encode cache entry; dropping write");
                self.store.delete(key);
            }
        }
    }

    pub fn get<V: DeserializeOwned>(&self, key: &str) -> CacheLookup<V> {
        let Some(raw) = self.store.get(key) else {
            counter!(METRIC_CACHE_MISS).increment(1);
            return CacheLookup::Miss;
        };

        let entry: Entry<V> = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, error = %err, "undecodable cache entry treated as miss");
                counter!(METRIC_CACHE_MISS).increment(1);
                return CacheLookup::Miss;
            }
        };

        counter!(METRIC_CACHE_HIT).increment(1);
        let age = (self.clock.now() - entry.stored_at).max(Duration::ZERO);
        debug!(key, age_seconds = age.whole_seconds(), "cache hit");
        CacheLookup::Hit {
            value: entry.value,
            age,
        }
    }

    pub fn delete(&self, key: &str) {
        self.store.delete(key);
    }

    /// Administrative escape hatch: drops every entry in the store.
    pub fn flush_all(&self) {
        self.store.flush_all();
        debug!("cache flushed");
    }
}
