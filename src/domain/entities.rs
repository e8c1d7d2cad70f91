//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::domain::error::DomainError;

/// Identifier assigned by the persistence collaborator.
pub type UserId = i64;
/// Identifier assigned by the persistence collaborator.
pub type PostId = i64;

const CREATED_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [year]"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    /// `hash|salt` as produced by [`crate::security::PasswordHasher`].
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: OffsetDateTime,
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub subject: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub created_by: Option<String>,
}

impl PostRecord {
    /// The public JSON shape of a post.
    pub fn to_view(&self) -> PostView {
        let created = self
            .created_at
            .format(CREATED_FORMAT)
            .unwrap_or_else(|_| self.created_at.to_string());
        PostView {
            subject: self.subject.clone(),
            content: self.content.clone(),
            created,
        }
    }
}

/// A post that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub subject: String,
    pub content: String,
    pub created_by: Option<String>,
}

impl NewPost {
    /// Both subject and content must be non-empty; whitespace counts.
    pub fn new(
        subject: impl Into<String>,
        content: impl Into<String>,
        created_by: Option<String>,
    ) -> Result<Self, DomainError> {
        let subject = subject.into();
        let content = content.into();
        if subject.is_empty() || content.is_empty() {
            return Err(DomainError::validation(
                "we need both a subject and some content",
            ));
        }
        Ok(Self {
            subject,
            content,
            created_by,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub subject: String,
    pub content: String,
    pub created: String,
}
