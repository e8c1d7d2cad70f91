//! Salted SHA-256 password records stored as `hexhash|salt`.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::DELIMITER;

pub const DEFAULT_SALT_LENGTH: usize = 5;

const SALT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Derives and checks password records.
///
/// Salts come from the thread-local general purpose generator. That is enough
/// to make equal passwords hash differently per user, but salts are not
/// secret-grade randomness.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    salt_length: usize,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_SALT_LENGTH)
    }
}

impl PasswordHasher {
    pub fn new(salt_length: usize) -> Self {
        Self { salt_length }
    }

    pub fn salt_length(&self) -> usize {
        self.salt_length
    }

    /// Random ASCII letters, `salt_length` of them.
    pub fn generate_salt(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.salt_length)
            .map(|_| SALT_ALPHABET[rng.gen_range(0..SALT_ALPHABET.len())] as char)
            .collect()
    }

    /// Hashes with a freshly generated salt. Used once, at registration.
    pub fn hash_password(&self, name: &str, password: &str) -> String {
        let salt = self.generate_salt();
        self.hash_password_with_salt(name, password, &salt)
    }

    pub fn hash_password_with_salt(&self, name: &str, password: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(password.as_bytes());
        hasher.update(salt.as_bytes());
        let hash = hex::encode(hasher.finalize());
        format!("{hash}{DELIMITER}{salt}")
    }

    /// Recomputes the record with the stored salt and compares the whole record.
    ///
    /// A record without a delimiter is treated as all salt and never matches.
    pub fn verify_password(&self, name: &str, password: &str, record: &str) -> bool {
        let salt = record
            .rsplit_once(DELIMITER)
            .map_or(record, |(_, salt)| salt);
        let candidate = self.hash_password_with_salt(name, password, salt);
        candidate.as_bytes().ct_eq(record.as_bytes()).into()
    }
}
