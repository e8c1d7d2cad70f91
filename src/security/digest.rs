//! HMAC-SHA256 signed tokens of the form `payload|hexdigest`.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use super::DELIMITER;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretKeyError {
    #[error("secret key must not be empty")]
    Empty,
    #[error("secret key rejected by digest: {0}")]
    Rejected(String),
}

/// Process-wide signing secret. Loaded once, never rotated while running.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Arc<[u8]>);

impl SecretKey {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, SecretKeyError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(SecretKeyError::Empty);
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"<redacted>").finish()
    }
}

/// Signs payloads and verifies tokens against a fixed [`SecretKey`].
///
/// The keyed MAC state is built once and cloned per operation, so the codec
/// is cheap to share between request tasks.
#[derive(Clone)]
pub struct DigestCodec {
    mac: HmacSha256,
}

impl DigestCodec {
    pub fn new(key: &SecretKey) -> Result<Self, SecretKeyError> {
        let mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .map_err(|err| SecretKeyError::Rejected(err.to_string()))?;
        Ok(Self { mac })
    }

    /// `payload|hex(hmac(payload))`. Deterministic for a fixed key.
    pub fn sign(&self, payload: &str) -> String {
        let digest = self.digest(payload);
        format!("{payload}{DELIMITER}{digest}")
    }

    /// Returns the payload when the embedded digest matches, `None` otherwise.
    ///
    /// The split happens on the last delimiter, so payloads may contain `|`.
    pub fn verify(&self, token: &str) -> Option<String> {
        let Some((payload, digest)) = token.rsplit_once(DELIMITER) else {
            debug!(reason = "missing_delimiter", "token verification failed");
            return None;
        };

        let expected = self.digest(payload);
        if expected.as_bytes().ct_eq(digest.as_bytes()).into() {
            Some(payload.to_string())
        } else {
            debug!(reason = "digest_mismatch", "token verification failed");
            None
        }
    }

    fn digest(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for DigestCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> DigestCodec {
        DigestCodec::new(&SecretKey::new(secret).expect("non-empty key")).expect("codec")
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let codec = codec("41oSxXU0kuHuRugauSYz");
        for payload in ["7", "", "hello world", "a|b|c", "ünïcödé"] {
            let token = codec.sign(payload);
            assert_eq!(codec.verify(&token).as_deref(), Some(payload));
        }
    }

    #[test]
    fn sign_is_deterministic() {
        let codec = codec("key");
        assert_eq!(codec.sign("42"), codec.sign("42"));
    }

    #[test]
    fn token_layout_is_payload_delimiter_hex_digest() {
        let token = codec("key").sign("7");
        let (payload, digest) = token.split_once('|').expect("delimiter");
        assert_eq!(payload, "7");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tampered_digest_is_rejected() {
        let codec = codec("key");
        let token = codec.sign("7");
        let digest_start = token.find('|').expect("delimiter") + 1;

        for index in digest_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).expect("ascii");
            assert_eq!(codec.verify(&tampered), None, "index {index}");
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec("key");
        let token = codec.sign("7");
        let forged = token.replacen('7', "8", 1);
        assert_eq!(codec.verify(&forged), None);
    }

    #[test]
    fn malformed_tokens_fail_quietly() {
        let codec = codec("key");
        assert_eq!(codec.verify(""), None);
        assert_eq!(codec.verify("no-delimiter"), None);
        assert_eq!(codec.verify("|"), None);
        assert_eq!(codec.verify("7|not-hex"), None);
    }

    #[test]
    fn uppercase_digest_does_not_match() {
        let codec = codec("key");
        let token = codec.sign("7").to_uppercase();
        assert_eq!(codec.verify(&token), None);
    }

    #[test]
    fn changed_key_invalidates_tokens() {
        let first = codec("first-secret");
        let second = codec("second-secret");
        for payload in ["1", "42", "alice"] {
            assert_eq!(second.verify(&first.sign(payload)), None);
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SecretKey::new(""), Err(SecretKeyError::Empty));
    }

    #[test]
    fn debug_output_hides_secret() {
        let key = SecretKey::new("super-secret").expect("key");
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
