//! Salted SHA-512 password hashing and verification.
//!
//! Each record carries its own random salt. An optional process-wide
//! secret salt is prepended to the record salt before hashing; rotating
//! that secret invalidates every stored hash, which is a documented
//! operational hazard rather than a bug.

use sha2::{Digest, Sha512};

use authhub_core::config::auth::AuthConfig;

use crate::random::random_alphanumeric;

/// Length of the per-record random salt.
pub const RECORD_SALT_LEN: usize = 32;

/// A computed password digest together with the record salt used for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    /// Hex-encoded SHA-512 digest (128 chars).
    pub hash: String,
    /// The per-record salt, stored alongside the hash.
    pub salt: String,
}

/// Handles password hashing and verification.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Optional process-wide secret salt, mixed in before the record salt.
    secret_salt: Option<String>,
}

impl PasswordHasher {
    /// Creates a hasher from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret_salt: config.password_salt.clone(),
        }
    }

    /// Creates a hasher with no process-wide secret salt.
    pub fn without_secret_salt() -> Self {
        Self { secret_salt: None }
    }

    /// Hashes a plaintext password.
    ///
    /// Generates a fresh random record salt when `existing_salt` is
    /// `None`; passing the stored salt reproduces the stored digest for
    /// comparison.
    pub fn hash_password(&self, password: &str, existing_salt: Option<&str>) -> HashedPassword {
        let salt = match existing_salt {
            Some(salt) => salt.to_string(),
            None => random_alphanumeric(RECORD_SALT_LEN),
        };
        let hash = self.digest(password, &salt);
        HashedPassword { hash, salt }
    }

    /// Verifies a plaintext password against a stored digest and salt.
    ///
    /// Recomputes the digest with the stored salt and compares
    /// byte-for-byte.
    pub fn verify(&self, password: &str, stored_hash: &str, stored_salt: &str) -> bool {
        self.digest(password, stored_salt) == stored_hash
    }

    /// SHA-512 over `password + secret_salt + record_salt`, hex-encoded.
    fn digest(&self, password: &str, record_salt: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(password.as_bytes());
        if let Some(secret) = &self.secret_salt {
            hasher.update(secret.as_bytes());
        }
        hasher.update(record_salt.as_bytes());
        hex_encode(&hasher.finalize())
    }
}

/// Encode bytes to a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
