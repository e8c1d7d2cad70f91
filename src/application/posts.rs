//! Post creation and the read paths behind the front page and permalinks.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::application::repos::{ItemRepository, RepoError};
use crate::cache::{Aged, ListingCache};
use crate::domain::entities::{NewPost, PostId, PostRecord, PostView, UserRecord};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to encode post json: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn ItemRepository>,
    listing: ListingCache,
}

impl PostService {
    pub fn new(posts: Arc<dyn ItemRepository>, listing: ListingCache) -> Self {
        Self { posts, listing }
    }

    /// Stores the post, then refreshes the front page listing so the next
    /// reader sees it.
    #[instrument(skip_all, fields(author = ?author.map(|user| &user.name)))]
    pub async fn create_post(
        &self,
        subject: &str,
        content: &str,
        author: Option<&UserRecord>,
    ) -> Result<PostId, PostError> {
        let post = NewPost::new(subject, content, author.map(|user| user.name.clone()))?;
        let id = self.posts.put_item(post).await?;
        info!(post_id = id, "post created");
        self.listing.notify_write().await;
        Ok(id)
    }

    /// The cached front page, possibly stale.
    pub async fn front_page(&self) -> Aged<Vec<PostRecord>> {
        self.listing
            .get_latest(self.listing.default_limit(), false)
            .await
    }

    pub async fn permalink(&self, id: PostId) -> Result<Aged<PostRecord>, PostError> {
        self.listing
            .get_item(id)
            .await
            .ok_or_else(|| DomainError::not_found("post").into())
    }

    /// Newest posts as a JSON array, read straight from the repository.
    pub async fn front_json(&self) -> Result<String, PostError> {
        let posts = self
            .posts
            .query_latest_items(self.listing.default_limit())
            .await?;
        let views: Vec<PostView> = posts.iter().map(PostRecord::to_view).collect();
        Ok(serde_json::to_string(&views)?)
    }

    /// One post as a JSON object, read straight from the repository.
    pub async fn permalink_json(&self, id: PostId) -> Result<String, PostError> {
        let post = self
            .posts
            .get_item_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post"))?;
        Ok(serde_json::to_string(&post.to_view())?)
    }

    pub fn flush_cache(&self) {
        self.listing.flush_all();
    }
}
