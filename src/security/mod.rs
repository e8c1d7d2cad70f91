//! Keyed digests for session tokens and salted password records.

mod digest;
mod password;

pub use digest::{DigestCodec, SecretKey, SecretKeyError};
pub use password::{DEFAULT_SALT_LENGTH, PasswordHasher};

/// Separates a payload from its digest, and a password hash from its salt.
pub const DELIMITER: char = '|';
