//! Process-local repositories backing the CLI demo and tests.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::application::repos::{ItemRepository, RepoError, UserRepository};
use crate::cache::lock::{rw_read, rw_write};
use crate::cache::{Clock, SystemClock};
use crate::domain::entities::{NewPost, NewUser, PostId, PostRecord, UserId, UserRecord};

const SOURCE: &str = "infra::memory";

/// Users keyed by id with a unique name index.
pub struct InMemoryUsers {
    users: DashMap<UserId, UserRecord>,
    by_name: DashMap<String, UserId>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicI64::new(0),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUsers {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get_user_by_name(&self, name: &str) -> Result<Option<UserRecord>, RepoError> {
        let Some(id) = self.by_name.get(name).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn put_user(&self, user: NewUser) -> Result<UserId, RepoError> {
        match self.by_name.entry(user.name.clone()) {
            Entry::Occupied(_) => Err(RepoError::Duplicate {
                constraint: "users.name".to_string(),
            }),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                self.users.insert(
                    id,
                    UserRecord {
                        id,
                        name: user.name,
                        password_hash: user.password_hash,
                        email: user.email,
                        created_at: self.clock.now(),
                    },
                );
                slot.insert(id);
                Ok(id)
            }
        }
    }
}

/// Posts in insertion order; ids are assigned sequentially from 1.
pub struct InMemoryPosts {
    posts: RwLock<Vec<PostRecord>>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryPosts {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(0),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.posts, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPosts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for InMemoryPosts {
    async fn query_latest_items(&self, limit: usize) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts = rw_read(&self.posts, SOURCE, "query_latest_items").clone();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts.truncate(limit);
        Ok(posts)
    }

    async fn get_item_by_id(&self, id: PostId) -> Result<Option<PostRecord>, RepoError> {
        let posts = rw_read(&self.posts, SOURCE, "get_item_by_id");
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn put_item(&self, post: NewPost) -> Result<PostId, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = PostRecord {
            id,
            subject: post.subject,
            content: post.content,
            created_at: self.clock.now(),
            created_by: post.created_by,
        };
        rw_write(&self.posts, SOURCE, "put_item").push(record);
        Ok(id)
    }
}
