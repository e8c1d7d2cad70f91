//! Wiring of the services from settings and collaborators.

use std::sync::Arc;

use crate::application::accounts::AccountService;
use crate::application::posts::PostService;
use crate::application::repos::{ItemRepository, UserRepository};
use crate::application::sessions::SessionManager;
use crate::cache::{CacheConfig, KeyValueStore, ListingCache, MemoryStore, TimedCache};
use crate::config::Settings;
use crate::security::{DigestCodec, PasswordHasher, SecretKeyError};

/// Everything a request handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppContext {
    pub sessions: SessionManager,
    pub accounts: AccountService,
    pub posts: PostService,
    pub hasher: PasswordHasher,
}

impl AppContext {
    /// Builds the services over an in-process [`MemoryStore`].
    pub fn new(
        settings: &Settings,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn ItemRepository>,
    ) -> Result<Self, SecretKeyError> {
        let cache_config = CacheConfig::from(&settings.cache);
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(&cache_config));
        Self::with_store(settings, users, posts, store)
    }

    pub fn with_store(
        settings: &Settings,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn ItemRepository>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, SecretKeyError> {
        let codec = DigestCodec::new(&settings.security.secret_key)?;
        let hasher = PasswordHasher::new(settings.security.salt_length.get());
        let sessions = SessionManager::new(codec, users.clone());
        let accounts = AccountService::new(users, hasher.clone(), sessions.clone());

        let listing = ListingCache::new(
            TimedCache::new(store),
            posts.clone(),
            settings.cache.listing_limit.get(),
        );
        let posts = PostService::new(posts, listing);

        Ok(Self {
            sessions,
            accounts,
            posts,
            hasher,
        })
    }
}
