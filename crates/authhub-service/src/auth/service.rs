//! Authentication service — credential checks, login, and the password
//! reset flow.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use authhub_auth::password::{PasswordHasher, PasswordValidator};
use authhub_auth::reset::{generate_reset_key, is_reset_expired};
use authhub_auth::resolve_permissions;
use authhub_core::config::AuthConfig;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_database::repositories::assignment::AssignmentRepository;
use authhub_database::repositories::permission::PermissionRepository;
use authhub_database::repositories::user::UserRepository;
use authhub_entity::user::User;

use crate::context::{SessionUser, project_session};
use crate::notify::{NotificationContext, NotificationSender, NotificationTemplate};

/// Handles credential validation, login, and password resets.
#[derive(Clone)]
pub struct AuthService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Permission repository, for session projection.
    permission_repo: Arc<PermissionRepository>,
    /// Assignment repository, for session projection.
    assignment_repo: Arc<AssignmentRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy validator.
    validator: Arc<PasswordValidator>,
    /// Outbound notification transport.
    sender: Arc<dyn NotificationSender>,
    /// Hours until a pending reset key expires.
    reset_expires_after_hours: u64,
}

impl AuthService {
    /// Creates a new authentication service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        permission_repo: Arc<PermissionRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        sender: Arc<dyn NotificationSender>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            permission_repo,
            assignment_repo,
            hasher,
            validator,
            sender,
            reset_expires_after_hours: config.reset_expires_after_hours,
        }
    }

    /// Checks a login id and password pair.
    ///
    /// An unknown login and a wrong password produce the same error, so
    /// a caller cannot probe which logins exist.
    pub async fn validate_credentials(&self, login_id: &str, password: &str) -> AppResult<User> {
        let user = self
            .user_repo
            .find_by_login(login_id)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !self.hasher.verify(password, &user.pass_hash, &user.pass_salt) {
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Authenticates and projects the session context.
    ///
    /// Inactive accounts are refused even with correct credentials.
    pub async fn login(&self, login_id: &str, password: &str) -> AppResult<SessionUser> {
        let user = self.validate_credentials(login_id, password).await?;

        if user.is_inactive() {
            return Err(AppError::authentication("Account is inactive"));
        }

        let permissions = self.permission_repo.find_all().await?;
        let user_rows = self.assignment_repo.user_rows(user.id).await?;
        let group_rows = self.assignment_repo.group_rows_for_user(user.id).await?;

        let resolved =
            resolve_permissions(&permissions, &user_rows, &group_rows, user.super_user);
        let session = project_session(&user, &resolved);

        info!(user_id = %user.id, login_id = %user.login_id, "User logged in");

        Ok(session)
    }

    /// Sets a user's password after policy validation.
    ///
    /// `require_reset` controls whether the user must change it on next
    /// login; self-service changes pass `false`.
    pub async fn set_password(
        &self,
        user_id: Uuid,
        new_password: &str,
        require_reset: bool,
    ) -> AppResult<()> {
        self.validator.validate(new_password)?;

        let hashed = self.hasher.hash_password(new_password, None);
        self.user_repo
            .update_password(user_id, &hashed.hash, &hashed.salt, require_reset)
            .await?;

        info!(user_id = %user_id, require_reset, "Password updated");
        Ok(())
    }

    /// Starts a password reset for the account behind `email`.
    ///
    /// Returns whether a matching user was found. A fresh key always
    /// overwrites any pending one — there is at most one pending reset
    /// per user. The notification is attempted only after the key is
    /// committed; a send failure is logged, never rolled back.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<bool> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Ok(false);
        };

        let key = generate_reset_key();
        let issued_at = Utc::now();
        self.user_repo.set_reset_key(user.id, &key, issued_at).await?;

        info!(user_id = %user.id, "Password reset key issued");

        let context = NotificationContext {
            login_id: user.login_id.clone(),
            password: None,
            reset_key: Some(key),
        };
        if let Err(e) = self
            .sender
            .send(NotificationTemplate::PasswordReset, &user.email_address, context)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Password reset notification failed");
        }

        Ok(true)
    }

    /// Completes a password reset: checks the pending key, then sets the
    /// new password and clears the key in one transaction.
    ///
    /// An expired key and a wrong key are distinguishable (`Expired` vs
    /// `Invalid`). The new password does not force another reset.
    pub async fn consume_password_reset(
        &self,
        login_id: &str,
        key: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_login(login_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{login_id}' not found")))?;

        let (Some(pending_key), Some(issued_at)) = (&user.pass_reset_key, user.pass_reset_ts)
        else {
            return Err(AppError::invalid("No password reset is pending"));
        };

        if is_reset_expired(issued_at, Utc::now(), self.reset_expires_after_hours) {
            return Err(AppError::expired("Password reset key has expired"));
        }
        if pending_key != key {
            return Err(AppError::invalid("Password reset key does not match"));
        }

        self.validator.validate(new_password)?;

        let hashed = self.hasher.hash_password(new_password, None);
        self.user_repo
            .consume_reset(user.id, &hashed.hash, &hashed.salt)
            .await?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Unconditionally clears any pending reset key for the user.
    pub async fn kill_reset_key(&self, user_id: Uuid) -> AppResult<()> {
        self.user_repo.clear_reset_key(user_id).await?;
        info!(user_id = %user_id, "Password reset key cleared");
        Ok(())
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid login or password")
}
