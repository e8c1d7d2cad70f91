//! Signup and login flows.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::application::repos::{RepoError, UserRepository};
use crate::application::sessions::SessionManager;
use crate::domain::entities::{NewUser, UserRecord};
use crate::domain::users::{valid_email, valid_password, valid_username};
use crate::security::PasswordHasher;

const USERNAME_TAKEN: &str = "This username already exists.";

/// Per-field signup problems, all collected in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupErrors {
    pub username: Option<&'static str>,
    pub password: Option<&'static str>,
    pub verify: Option<&'static str>,
    pub email: Option<&'static str>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.verify.is_none()
            && self.email.is_none()
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("signup form rejected: {0:?}")]
    InvalidSignup(SignupErrors),
    #[error("invalid login")]
    InvalidLogin,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub verify: String,
    pub email: Option<String>,
}

/// A user together with the session token that logs them in.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: UserRecord,
    pub token: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    sessions: SessionManager,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        sessions: SessionManager,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    /// Validates the form, stores the user with a fresh salted hash and opens
    /// a session.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn signup(&self, form: SignupForm) -> Result<Authenticated, AccountError> {
        let mut errors = SignupErrors::default();

        if !valid_username(&form.username) {
            errors.username = Some("That's not a valid username.");
        } else if self.users.get_user_by_name(&form.username).await?.is_some() {
            errors.username = Some(USERNAME_TAKEN);
        }

        if !valid_password(&form.password) {
            errors.password = Some("That's not a valid password.");
        } else if form.password != form.verify {
            errors.verify = Some("Your passwords didn't match.");
        }

        let email = form.email.filter(|email| !email.is_empty());
        if !valid_email(email.as_deref()) {
            errors.email = Some("That's not a valid email.");
        }

        if !errors.is_empty() {
            return Err(AccountError::InvalidSignup(errors));
        }

        let password_hash = self.hasher.hash_password(&form.username, &form.password);
        let inserted = self
            .users
            .put_user(NewUser {
                name: form.username.clone(),
                password_hash,
                email,
            })
            .await;
        let id = match inserted {
            Ok(id) => id,
            Err(RepoError::Duplicate { constraint }) => {
                warn!(%constraint, "username claimed by a concurrent signup");
                return Err(AccountError::InvalidSignup(SignupErrors {
                    username: Some(USERNAME_TAKEN),
                    ..SignupErrors::default()
                }));
            }
            Err(err) => return Err(err.into()),
        };

        let user = self.users.get_user_by_id(id).await?.ok_or_else(|| {
            RepoError::from_persistence(format!("user {id} vanished after insert"))
        })?;
        info!(user_id = id, "user registered");

        Ok(Authenticated {
            token: self.sessions.start_session(user.id),
            user,
        })
    }

    /// Every failure, from a malformed name to a wrong password, is the same
    /// `InvalidLogin`.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authenticated, AccountError> {
        if !valid_username(username) {
            return Err(AccountError::InvalidLogin);
        }

        let Some(user) = self.users.get_user_by_name(username).await? else {
            return Err(AccountError::InvalidLogin);
        };

        if !self
            .hasher
            .verify_password(username, password, &user.password_hash)
        {
            warn!(user_id = user.id, "password rejected");
            return Err(AccountError::InvalidLogin);
        }

        info!(user_id = user.id, "user logged in");
        Ok(Authenticated {
            token: self.sessions.start_session(user.id),
            user,
        })
    }

    pub fn logout(&self) -> String {
        self.sessions.end_session()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::entities::UserId;
    use crate::infra::memory::InMemoryUsers;
    use crate::security::{DigestCodec, SecretKey};

    fn service() -> AccountService {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUsers::new());
        let key = SecretKey::new("test-secret").expect("key");
        let sessions = SessionManager::new(DigestCodec::new(&key).expect("codec"), users.clone());
        AccountService::new(users, PasswordHasher::default(), sessions)
    }

    fn form(username: &str, password: &str, verify: &str, email: Option<&str>) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            password: password.to_string(),
            verify: verify.to_string(),
            email: email.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn signup_then_login() {
        let accounts = service();
        let registered = accounts
            .signup(form("alice", "secret123", "secret123", Some("alice@example.com")))
            .await
            .expect("signup");

        assert_eq!(registered.user.name, "alice");
        assert_eq!(registered.user.email.as_deref(), Some("alice@example.com"));
        assert_ne!(registered.user.password_hash, "secret123");
        assert_eq!(
            accounts.sessions().resolve_session(&registered.token),
            Some(registered.user.id)
        );

        let logged_in = accounts.login("alice", "secret123").await.expect("login");
        assert_eq!(logged_in.user.id, registered.user.id);
        // The stored salt is reused, never regenerated on login.
        assert_eq!(logged_in.user.password_hash, registered.user.password_hash);
    }

    #[tokio::test]
    async fn signup_collects_every_field_error() {
        let accounts = service();
        let err = accounts
            .signup(form("a", "pw", "pw", Some("nope")))
            .await
            .expect_err("invalid form");

        match err {
            AccountError::InvalidSignup(errors) => {
                assert!(errors.username.is_some());
                assert!(errors.password.is_some());
                assert!(errors.verify.is_none());
                assert!(errors.email.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn signup_rejects_mismatch_and_duplicates() {
        let accounts = service();
        let mismatch = accounts
            .signup(form("alice", "secret123", "secret124", None))
            .await
            .expect_err("mismatch");
        assert!(matches!(
            mismatch,
            AccountError::InvalidSignup(SignupErrors { verify: Some(_), .. })
        ));

        accounts
            .signup(form("alice", "secret123", "secret123", Some("")))
            .await
            .expect("first signup");
        let duplicate = accounts
            .signup(form("alice", "other123", "other123", None))
            .await
            .expect_err("duplicate");
        assert!(matches!(
            duplicate,
            AccountError::InvalidSignup(SignupErrors {
                username: Some("This username already exists."),
                ..
            })
        ));
    }

    /// Sees no user on lookup but loses the insert, as when another signup
    /// claims the name in between.
    struct ClaimedOnInsert;

    #[async_trait]
    impl UserRepository for ClaimedOnInsert {
        async fn get_user_by_name(&self, _name: &str) -> Result<Option<UserRecord>, RepoError> {
            Ok(None)
        }

        async fn get_user_by_id(&self, _id: UserId) -> Result<Option<UserRecord>, RepoError> {
            Ok(None)
        }

        async fn put_user(&self, _user: NewUser) -> Result<UserId, RepoError> {
            Err(RepoError::Duplicate {
                constraint: "users.name".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn name_taken_at_insert_is_a_username_error() {
        let users: Arc<dyn UserRepository> = Arc::new(ClaimedOnInsert);
        let key = SecretKey::new("test-secret").expect("key");
        let sessions = SessionManager::new(DigestCodec::new(&key).expect("codec"), users.clone());
        let accounts = AccountService::new(users, PasswordHasher::default(), sessions);

        let err = accounts
            .signup(form("alice", "secret123", "secret123", None))
            .await
            .expect_err("insert lost");
        match err {
            AccountError::InvalidSignup(errors) => assert_eq!(
                errors,
                SignupErrors {
                    username: Some("This username already exists."),
                    ..SignupErrors::default()
                }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let accounts = service();
        accounts
            .signup(form("alice", "secret123", "secret123", None))
            .await
            .expect("signup");

        for (name, password) in [("alice", "wrong"), ("bob", "secret123"), ("x", "secret123")] {
            assert!(matches!(
                accounts.login(name, password).await,
                Err(AccountError::InvalidLogin)
            ));
        }
    }

    #[test]
    fn logout_clears_the_cookie() {
        assert_eq!(service().logout(), "");
    }
}
