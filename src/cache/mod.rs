//! Vellum Cache System
//!
//! Cache-aside storage that tells readers how stale their data is:
//!
//! - **Store**: opaque key/value storage ([`KeyValueStore`]), bounded in
//!   process by [`MemoryStore`]
//! - **Timed cache**: stamps writes and reports the age on reads
//! - **Listing policy**: the front page listing and post permalinks
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! store_capacity = 1024
//! listing_limit = 10
//! ```

mod clock;
mod config;
mod keys;
mod listing;
pub(crate) mod lock;
mod store;
mod timed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::CacheKey;
pub use listing::{AgeLabel, Aged, ListingCache};
pub use store::{KeyValueStore, MemoryStore};
pub use timed::{CacheLookup, TimedCache};

pub(crate) use config::{DEFAULT_LISTING_LIMIT, DEFAULT_STORE_CAPACITY};
pub(crate) use listing::METRIC_LISTING_REFRESH;
pub(crate) use store::METRIC_CACHE_EVICT;
pub(crate) use timed::{METRIC_CACHE_HIT, METRIC_CACHE_MISS};
