//! Password policy enforcement for new passwords.

use authhub_core::config::auth::AuthConfig;
use authhub_core::error::AppError;

/// Validates password complexity against the configured length window.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
    /// Maximum password length.
    max_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
        }
    }

    /// Validates a password against the configured policy.
    ///
    /// Returns `Ok(())` if the password meets all requirements, or an
    /// error describing the violation.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.chars().count() > self.max_length {
            return Err(AppError::validation(format!(
                "Password must be at most {} characters long",
                self.max_length
            )));
        }

        Ok(())
    }

    /// Validates that a password and its confirmation match.
    pub fn validate_confirmation(&self, password: &str, confirm: &str) -> Result<(), AppError> {
        if password != confirm {
            return Err(AppError::validation(
                "Password and confirmation do not match",
            ));
        }
        Ok(())
    }

    /// A short note describing the policy, for presentation layers.
    pub fn policy_note(&self) -> String {
        format!("min {} chars, max {} chars", self.min_length, self.max_length)
    }
}
