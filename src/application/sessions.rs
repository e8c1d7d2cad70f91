//! Stateless sessions: a signed cookie carrying the user id.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::repos::UserRepository;
use crate::domain::entities::{UserId, UserRecord};
use crate::security::DigestCodec;

/// Name of the cookie the session token travels in.
pub const SESSION_COOKIE: &str = "user_id";

/// Issues and resolves session tokens.
///
/// Holds no session table; a token stays valid for as long as the signing
/// key does.
#[derive(Clone)]
pub struct SessionManager {
    codec: DigestCodec,
    users: Arc<dyn UserRepository>,
}

impl SessionManager {
    pub fn new(codec: DigestCodec, users: Arc<dyn UserRepository>) -> Self {
        Self { codec, users }
    }

    pub fn start_session(&self, user_id: UserId) -> String {
        self.codec.sign(&user_id.to_string())
    }

    /// The id carried by a valid token; `None` for anything else.
    pub fn resolve_session(&self, token: &str) -> Option<UserId> {
        let payload = self.codec.verify(token)?;
        match payload.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(err) => {
                debug!(error = %err, "signed session payload is not a user id");
                None
            }
        }
    }

    /// The value that overwrites the session cookie on logout.
    pub fn end_session(&self) -> String {
        String::new()
    }

    /// Resolves the token and loads the user it names.
    pub async fn current_user(&self, token: &str) -> Option<UserRecord> {
        let id = self.resolve_session(token)?;
        match self.users.get_user_by_id(id).await {
            Ok(user) => user,
            Err(err) => {
                warn!(user_id = id, error = %err, "user lookup failed; session treated as absent");
                None
            }
        }
    }
}

/// `Set-Cookie` header value carrying `token` for the whole site.
pub fn set_cookie_header(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/")
}
