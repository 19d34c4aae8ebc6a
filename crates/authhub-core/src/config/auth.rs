//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Optional process-wide secret salt, prepended to every per-record
    /// salt before hashing. Changing this value after users exist
    /// invalidates all stored password hashes — an operational hazard,
    /// not a bug.
    #[serde(default)]
    pub password_salt: Option<String>,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// How long a password reset key stays valid, in hours.
    #[serde(default = "default_reset_expiry")]
    pub reset_expires_after_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_salt: None,
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            reset_expires_after_hours: default_reset_expiry(),
        }
    }
}

fn default_password_min() -> usize {
    6
}

fn default_password_max() -> usize {
    25
}

fn default_reset_expiry() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.password_min_length, 6);
        assert_eq!(config.password_max_length, 25);
        assert_eq!(config.reset_expires_after_hours, 24);
        assert!(config.password_salt.is_none());
    }
}
