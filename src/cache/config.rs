//! Cache configuration.
//!
//! Controls the bounded in-memory store and the front page listing size via
//! the `[cache]` table of `vellum.toml`.

use std::num::NonZeroUsize;

pub(crate) const DEFAULT_STORE_CAPACITY: usize = 1024;
pub(crate) const DEFAULT_LISTING_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entries held by the in-memory store before LRU eviction.
    pub store_capacity: usize,
    /// Number of posts the front page listing holds.
    pub listing_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store_capacity: DEFAULT_STORE_CAPACITY,
            listing_limit: DEFAULT_LISTING_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            store_capacity: settings.store_capacity.get(),
            listing_limit: settings.listing_limit.get(),
        }
    }
}

impl CacheConfig {
    /// Store capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn store_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.store_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.store_capacity, 1024);
        assert_eq!(config.listing_limit, 10);
    }

    #[test]
    fn built_from_loaded_settings() {
        let settings = crate::config::CacheSettings {
            store_capacity: NonZeroUsize::new(3).expect("non-zero"),
            listing_limit: NonZeroUsize::new(7).expect("non-zero"),
        };
        let config = CacheConfig::from(&settings);
        assert_eq!(config.store_capacity, 3);
        assert_eq!(config.listing_limit, 7);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            store_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.store_capacity_non_zero().get(), 1);
    }
}
