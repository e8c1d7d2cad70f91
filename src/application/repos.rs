//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NewPost, NewUser, PostId, PostRecord, UserId, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("storage backend unavailable")]
    Unavailable,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_name(&self, name: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepoError>;

    /// Persists a new user and returns the id the store assigned.
    async fn put_user(&self, user: NewUser) -> Result<UserId, RepoError>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// At most `limit` posts ordered by creation time, newest first.
    async fn query_latest_items(&self, limit: usize) -> Result<Vec<PostRecord>, RepoError>;

    async fn get_item_by_id(&self, id: PostId) -> Result<Option<PostRecord>, RepoError>;

    /// Persists a new post and returns the id the store assigned.
    async fn put_item(&self, post: NewPost) -> Result<PostId, RepoError>;
}
