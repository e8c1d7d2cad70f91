//! Cache key definitions.

use std::fmt::{Display, Formatter};

use crate::domain::entities::PostId;

/// Logical cache entries kept by the listing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The front page: most recent posts, newest first.
    LatestPosts,
    /// A single post's permalink view.
    Post(PostId),
}

impl CacheKey {
    /// The string the entry is stored under in the key/value store.
    pub fn store_key(&self) -> String {
        self.to_string()
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatestPosts => f.write_str("TOP_POSTS"),
            Self::Post(id) => write!(f, "POST_{id}"),
        }
    }
}
