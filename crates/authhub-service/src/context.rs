//! Session context projected for an authenticated user.
//!
//! The projection is an explicit value handed to callers; there is no
//! ambient current-user state anywhere in the workspace.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authhub_auth::ResolvedPermission;
use authhub_entity::user::User;

/// The authenticated user's session view: identity, flags, and the set
/// of approved permission names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// The user's identifier.
    pub user_id: Uuid,
    /// The user's login id.
    pub login_id: String,
    /// Display name, falling back to the login id.
    pub display_name: String,
    /// Whether the account bypasses permission checks.
    pub super_user: bool,
    /// Whether the user must change their password before proceeding.
    pub reset_required: bool,
    /// Names of permissions resolved as approved.
    pub permissions: HashSet<String>,
}

impl SessionUser {
    /// Whether the session holds the named permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }
}

/// Projects a user and their resolved permission rows into a session
/// value. Only approved rows contribute names; a super user's rows are
/// all approved by the resolver, so the full catalog comes along.
pub fn project_session(user: &User, resolved: &[ResolvedPermission]) -> SessionUser {
    let permissions = resolved
        .iter()
        .filter(|row| row.approved)
        .map(|row| row.permission_name.clone())
        .collect();

    SessionUser {
        user_id: user.id,
        login_id: user.login_id.clone(),
        display_name: user.name_or_login(),
        super_user: user.super_user,
        reset_required: user.reset_required,
        permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(super_user: bool) -> User {
        User {
            id: Uuid::new_v4(),
            login_id: "jsmith".to_string(),
            email_address: "jsmith@example.com".to_string(),
            pass_hash: String::new(),
            pass_salt: String::new(),
            reset_required: true,
            super_user,
            name_first: Some("Jan".to_string()),
            name_last: Some("Smith".to_string()),
            inactive_flag: false,
            inactive_date: None,
            pass_reset_key: None,
            pass_reset_ts: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn resolved(name: &str, approved: bool) -> ResolvedPermission {
        ResolvedPermission {
            permission_id: Uuid::new_v4(),
            permission_name: name.to_string(),
            user_approved: None,
            group_approved: 0,
            group_denied: 0,
            approved,
        }
    }

    #[test]
    fn test_project_session_keeps_approved_names_only() {
        let user = test_user(false);
        let rows = vec![
            resolved("users-admin", true),
            resolved("reports-view", false),
            resolved("files-read", true),
        ];

        let session = project_session(&user, &rows);

        assert!(session.has_permission("users-admin"));
        assert!(session.has_permission("files-read"));
        assert!(!session.has_permission("reports-view"));
        assert_eq!(session.permissions.len(), 2);
    }

    #[test]
    fn test_project_session_carries_flags_and_display_name() {
        let user = test_user(true);
        let session = project_session(&user, &[]);

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.login_id, "jsmith");
        assert_eq!(session.display_name, "Jan Smith");
        assert!(session.super_user);
        assert!(session.reset_required);
        assert!(session.permissions.is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let mut user = test_user(false);
        user.name_first = None;
        user.name_last = None;

        let session = project_session(&user, &[]);
        assert_eq!(session.display_name, "jsmith");
    }
}
