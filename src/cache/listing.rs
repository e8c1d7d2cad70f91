//! Cache-aside policy for the front page listing and post permalinks.
//!
//! The listing is recomputed from the repository on a miss or when forced,
//! and forced after every write that changes which posts are newest. Post
//! details are cached lazily on first read. Repository calls are awaited
//! without any cache lock held; overlapping refreshes race and the last
//! write wins.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use metrics::counter;
use time::Duration;
use tracing::{debug, info, warn};

use crate::application::repos::ItemRepository;
use crate::domain::entities::{PostId, PostRecord};

use super::keys::CacheKey;
use super::timed::{CacheLookup, TimedCache};

pub(crate) const METRIC_LISTING_REFRESH: &str = "vellum_listing_refresh_total";

/// A value together with how long ago it was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Aged<T> {
    pub value: T,
    pub age: Duration,
}

impl<T> Aged<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            age: Duration::ZERO,
        }
    }

    pub fn age_seconds(&self) -> i64 {
        self.age.whole_seconds()
    }

    pub fn label(&self) -> AgeLabel {
        AgeLabel(self.age_seconds())
    }
}

/// Renders as `queried N seconds ago`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeLabel(i64);

impl Display for AgeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "queried {} seconds ago", self.0)
    }
}

#[derive(Clone)]
pub struct ListingCache {
    cache: TimedCache,
    posts: Arc<dyn ItemRepository>,
    default_limit: usize,
}

impl ListingCache {
    pub fn new(cache: TimedCache, posts: Arc<dyn ItemRepository>, default_limit: usize) -> Self {
        Self {
            cache,
            posts,
            default_limit,
        }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Newest `n` posts, newest first, with the age of the cached copy.
    ///
    /// Recomputes (and reports age zero) when forced or on a miss. Otherwise
    /// the cached sequence is served as stored, cut to `n` when longer. A
    /// failed query yields an empty listing that is not cached.
    pub async fn get_latest(&self, n: usize, force_refresh: bool) -> Aged<Vec<PostRecord>> {
        let key = CacheKey::LatestPosts.store_key();
        if !force_refresh
            && let CacheLookup::Hit { mut value, age } = self.cache.get::<Vec<PostRecord>>(&key)
        {
            value.truncate(n);
            return Aged { value, age };
        }

        self.refresh_latest(&key, n).await
    }

    /// Called right after a write that changes which posts are newest.
    pub async fn notify_write(&self) -> Aged<Vec<PostRecord>> {
        self.get_latest(self.default_limit, true).await
    }

    /// A single post, served from cache when present and cached on first read.
    /// Missing posts are not cached.
    pub async fn get_item(&self, id: PostId) -> Option<Aged<PostRecord>> {
        let key = CacheKey::Post(id).store_key();
        if let CacheLookup::Hit { value, age } = self.cache.get::<PostRecord>(&key) {
            return Some(Aged { value, age });
        }

        match self.posts.get_item_by_id(id).await {
            Ok(Some(post)) => {
                self.cache.set(&key, &post);
                Some(Aged::fresh(post))
            }
            Ok(None) => None,
            Err(err) => {
                warn!(post_id = id, error = %err, "post lookup failed; treating as absent");
                None
            }
        }
    }

    pub fn flush_all(&self) {
        self.cache.flush_all();
        info!("listing and post caches flushed");
    }

    async fn refresh_latest(&self, key: &str, n: usize) -> Aged<Vec<PostRecord>> {
        match self.posts.query_latest_items(n).await {
            Ok(mut items) => {
                items.truncate(n);
                self.cache.set(key, &items);
                counter!(METRIC_LISTING_REFRESH).increment(1);
                debug!(limit = n, count = items.len(), "listing refreshed");
                Aged::fresh(items)
            }
            Err(err) => {
                warn!(limit = n, error = %err, "listing query failed; serving empty listing");
                Aged::fresh(Vec::new())
            }
        }
    }
}
