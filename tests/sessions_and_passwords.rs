use std::sync::Arc;

use vellum::application::repos::UserRepository;
use vellum::application::sessions::{SessionManager, set_cookie_header};
use vellum::domain::entities::NewUser;
use vellum::infra::memory::InMemoryUsers;
use vellum::security::{DigestCodec, PasswordHasher, SecretKey};

fn codec(secret: &str) -> DigestCodec {
    let key = SecretKey::new(secret).expect("non-empty key");
    DigestCodec::new(&key).expect("hmac accepts any key length")
}

fn sessions(secret: &str) -> (SessionManager, Arc<InMemoryUsers>) {
    let users = Arc::new(InMemoryUsers::new());
    let manager = SessionManager::new(codec(secret), users.clone());
    (manager, users)
}

#[test]
fn alice_registers_and_logs_in() {
    let hasher = PasswordHasher::default();
    let record = hasher.hash_password("alice", "secret123");

    let (digest, salt) = record.rsplit_once('|').expect("record carries a salt");
    assert_eq!(digest.len(), 64);
    assert_eq!(salt.len(), 5);
    assert!(salt.chars().all(|c| c.is_ascii_alphabetic()));

    assert!(hasher.verify_password("alice", "secret123", &record));
    assert!(!hasher.verify_password("alice", "wrong", &record));
    assert!(!hasher.verify_password("bob", "secret123", &record));
}

#[test]
fn tampering_with_any_digest_character_breaks_the_session() {
    let (manager, _) = sessions("imsosecret");
    let token = manager.start_session(7);

    let (payload, digest) = token.split_once('|').expect("signed token");
    assert_eq!(payload, "7");
    assert_eq!(manager.resolve_session(&token), Some(7));

    for (index, original) in digest.char_indices() {
        let replacement = if original == '0' { '1' } else { '0' };
        let mut forged = digest.to_string();
        forged.replace_range(index..index + 1, &replacement.to_string());
        let forged = format!("{payload}|{forged}");
        assert_eq!(manager.resolve_session(&forged), None, "position {index}");
    }
}

#[test]
fn rotating_the_key_invalidates_issued_tokens() {
    let first = codec("key-one");
    let second = codec("key-two");

    for payload in ["42", "", "a|b|c", "ünïcödé"] {
        let token = first.sign(payload);
        assert_eq!(first.verify(&token).as_deref(), Some(payload));
        assert_eq!(second.verify(&token), None);
    }
}

#[test]
fn logout_value_never_resolves() {
    let (manager, _) = sessions("imsosecret");
    assert_eq!(manager.resolve_session(&manager.start_session(42)), Some(42));

    let cleared = manager.end_session();
    assert_eq!(manager.resolve_session(&cleared), None);
    assert_eq!(set_cookie_header(&cleared), "user_id=; Path=/");
}

#[tokio::test]
async fn session_resolves_to_the_stored_user() {
    let (manager, users) = sessions("imsosecret");
    let id = users
        .put_user(NewUser {
            name: "alice".to_string(),
            password_hash: PasswordHasher::default().hash_password("alice", "secret123"),
            email: None,
        })
        .await
        .expect("insert user");

    let token = manager.start_session(id);
    let user = manager.current_user(&token).await.expect("user exists");
    assert_eq!(user.name, "alice");

    let stranger = manager.start_session(id + 100);
    assert!(manager.current_user(&stranger).await.is_none());
}
