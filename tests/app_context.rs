use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use vellum::application::accounts::{AccountError, SignupForm};
use vellum::application::context::AppContext;
use vellum::application::repos::{ItemRepository, UserRepository};
use vellum::config::{CacheSettings, LogFormat, LoggingSettings, SecuritySettings, Settings};
use vellum::infra::memory::{InMemoryPosts, InMemoryUsers};
use vellum::security::SecretKey;

fn settings(listing_limit: usize) -> Settings {
    Settings {
        security: SecuritySettings {
            secret_key: SecretKey::new("integration-secret").expect("key"),
            salt_length: NonZeroUsize::new(8).expect("non-zero"),
        },
        cache: CacheSettings {
            store_capacity: NonZeroUsize::new(64).expect("non-zero"),
            listing_limit: NonZeroUsize::new(listing_limit).expect("non-zero"),
        },
        logging: LoggingSettings {
            level: LevelFilter::WARN,
            format: LogFormat::Compact,
        },
    }
}

fn context(listing_limit: usize) -> AppContext {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUsers::new());
    let posts: Arc<dyn ItemRepository> = Arc::new(InMemoryPosts::new());
    AppContext::new(&settings(listing_limit), users, posts).expect("context")
}

fn signup_form(name: &str) -> SignupForm {
    SignupForm {
        username: name.to_string(),
        password: "secret123".to_string(),
        verify: "secret123".to_string(),
        email: None,
    }
}

#[tokio::test]
async fn signup_post_and_read_back_through_the_cache() {
    let app = context(2);

    let registered = app.accounts.signup(signup_form("alice")).await.expect("signup");
    let salt = registered
        .user
        .password_hash
        .rsplit_once('|')
        .map(|(_, salt)| salt)
        .expect("salted record");
    assert_eq!(salt.len(), 8);

    let author = app
        .sessions
        .current_user(&registered.token)
        .await
        .expect("session resolves");

    let mut ids = Vec::new();
    for subject in ["one", "two", "three"] {
        ids.push(
            app.posts
                .create_post(subject, "body", Some(&author))
                .await
                .expect("post"),
        );
    }

    let front = app.posts.front_page().await;
    let listed: Vec<_> = front.value.iter().map(|post| post.id).collect();
    assert_eq!(listed, [ids[2], ids[1]]);
    assert_eq!(front.label().to_string(), "queried 0 seconds ago");

    let permalink = app.posts.permalink(ids[0]).await.expect("permalink");
    assert_eq!(permalink.value.subject, "one");
    assert_eq!(permalink.value.created_by.as_deref(), Some("alice"));
}

#[tokio::test]
async fn login_reuses_the_stored_salt_and_rejects_bad_passwords() {
    let app = context(10);
    app.accounts.signup(signup_form("bob")).await.expect("signup");

    let session = app.accounts.login("bob", "secret123").await.expect("login");
    assert_eq!(app.sessions.resolve_session(&session.token), Some(session.user.id));
    assert!(app.hasher.verify_password("bob", "secret123", &session.user.password_hash));

    assert!(matches!(
        app.accounts.login("bob", "nope").await,
        Err(AccountError::InvalidLogin)
    ));
    assert_eq!(app.sessions.resolve_session(&app.accounts.logout()), None);
}

#[tokio::test]
async fn sessions_do_not_cross_differently_keyed_contexts() {
    let first = context(10);
    let registered = first.accounts.signup(signup_form("carol")).await.expect("signup");

    let mut other_settings = settings(10);
    other_settings.security.secret_key = SecretKey::new("another-secret").expect("key");
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUsers::new());
    let posts: Arc<dyn ItemRepository> = Arc::new(InMemoryPosts::new());
    let second = AppContext::new(&other_settings, users, posts).expect("context");

    assert_eq!(second.sessions.resolve_session(&registered.token), None);
}
