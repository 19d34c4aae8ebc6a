//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user in the AuthHub system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub login_id: String,
    /// Email address (unique, compared case-insensitively).
    pub email_address: String,
    /// SHA-512 password digest (hex).
    #[serde(skip_serializing)]
    pub pass_hash: String,
    /// Per-record random salt.
    #[serde(skip_serializing)]
    pub pass_salt: String,
    /// Whether the user must change their password at next login.
    pub reset_required: bool,
    /// Whether the user bypasses permission resolution entirely.
    pub super_user: bool,
    /// Given name.
    pub name_first: Option<String>,
    /// Family name.
    pub name_last: Option<String>,
    /// Explicit inactive flag.
    pub inactive_flag: bool,
    /// The account is also inactive once this date is in the past.
    pub inactive_date: Option<DateTime<Utc>>,
    /// Pending password reset key, if a reset was requested.
    #[serde(skip_serializing)]
    pub pass_reset_key: Option<String>,
    /// When the pending reset key was issued.
    pub pass_reset_ts: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check whether the account is inactive, either via the explicit
    /// flag or an `inactive_date` in the past.
    pub fn is_inactive(&self) -> bool {
        if self.inactive_flag {
            return true;
        }
        if let Some(inactive_date) = self.inactive_date {
            return inactive_date < Utc::now();
        }
        false
    }

    /// The user's full name, built from the optional name parts.
    ///
    /// Returns `None` when neither part is set.
    pub fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.name_first.as_deref().unwrap_or(""),
            self.name_last.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// The display name, falling back to the login id.
    pub fn name_or_login(&self) -> String {
        self.display_name()
            .unwrap_or_else(|| self.login_id.clone())
    }

    /// Whether a password reset is currently pending.
    pub fn has_pending_reset(&self) -> bool {
        self.pass_reset_key.is_some()
    }
}

/// Data required to insert a new user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired login name (unique).
    pub login_id: String,
    /// Email address (unique, case-insensitive).
    pub email_address: String,
    /// Pre-computed password digest.
    pub pass_hash: String,
    /// Per-record salt used for the digest.
    pub pass_salt: String,
    /// Whether the user must change the password at first login.
    pub reset_required: bool,
    /// Whether the user is a super user.
    pub super_user: bool,
    /// Given name (optional).
    pub name_first: Option<String>,
    /// Family name (optional).
    pub name_last: Option<String>,
    /// Explicit inactive flag.
    pub inactive_flag: bool,
    /// Optional date after which the account is inactive.
    pub inactive_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            login_id: "jdoe".to_string(),
            email_address: "jdoe@example.com".to_string(),
            pass_hash: String::new(),
            pass_salt: String::new(),
            reset_required: false,
            super_user: false,
            name_first: None,
            name_last: None,
            inactive_flag: false,
            inactive_date: None,
            pass_reset_key: None,
            pass_reset_ts: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inactive_flag() {
        let mut u = user();
        assert!(!u.is_inactive());
        u.inactive_flag = true;
        assert!(u.is_inactive());
    }

    #[test]
    fn test_inactive_date() {
        let mut u = user();
        u.inactive_date = Some(Utc::now() - Duration::days(1));
        assert!(u.is_inactive());
        u.inactive_date = Some(Utc::now() + Duration::days(1));
        assert!(!u.is_inactive());
    }

    #[test]
    fn test_display_name_fallback() {
        let mut u = user();
        assert_eq!(u.display_name(), None);
        assert_eq!(u.name_or_login(), "jdoe");
        u.name_first = Some("Jane".to_string());
        assert_eq!(u.name_or_login(), "Jane");
        u.name_last = Some("Doe".to_string());
        assert_eq!(u.name_or_login(), "Jane Doe");
    }
}
