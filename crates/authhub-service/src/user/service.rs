//! Administrative user operations — account CRUD, credential
//! provisioning, and the permission diagnostic views.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use authhub_auth::password::{PasswordHasher, PasswordValidator};
use authhub_auth::random::random_alphanumeric;
use authhub_auth::resolver::{GroupPermissionDetail, group_permission_detail};
use authhub_auth::{ResolvedPermission, resolve_permissions};
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::types::pagination::{PageRequest, PageResponse};
use authhub_database::repositories::assignment::AssignmentRepository;
use authhub_database::repositories::permission::PermissionRepository;
use authhub_database::repositories::user::UserRepository;
use authhub_entity::user::{CreateUser, User};

use crate::notify::{NotificationContext, NotificationSender, NotificationTemplate};

/// Length of the random initial password issued when none is supplied.
const INITIAL_PASSWORD_LEN: usize = 8;

/// Handles administrative user management.
#[derive(Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Permission repository, for the diagnostic views.
    permission_repo: Arc<PermissionRepository>,
    /// Assignment repository.
    assignment_repo: Arc<AssignmentRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy validator.
    validator: Arc<PasswordValidator>,
    /// Outbound notification transport.
    sender: Arc<dyn NotificationSender>,
}

/// Data for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Unique login id.
    pub login_id: String,
    /// Unique email address (case-insensitive).
    pub email_address: String,
    /// Initial password; a random one is issued when absent.
    pub password: Option<String>,
    /// First name (optional).
    pub name_first: Option<String>,
    /// Last name (optional).
    pub name_last: Option<String>,
    /// Whether the account bypasses permission checks.
    pub super_user: bool,
    /// Whether the account starts inactive.
    pub inactive_flag: bool,
    /// When false, the user is not forced to change the password on
    /// first login (self-service provisioning).
    pub password_reset_ok: bool,
    /// Groups the user belongs to.
    pub group_ids: Vec<Uuid>,
    /// Directly approved permission ids.
    pub approved_permission_ids: Vec<Uuid>,
    /// Directly denied permission ids.
    pub denied_permission_ids: Vec<Uuid>,
}

/// Data for updating a user. The relation sets are applied in full;
/// omitted memberships and assignments are removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// New email address.
    pub email_address: String,
    /// New password, when the administrator is changing it.
    pub password: Option<String>,
    /// First name (optional).
    pub name_first: Option<String>,
    /// Last name (optional).
    pub name_last: Option<String>,
    /// Whether the account bypasses permission checks.
    pub super_user: bool,
    /// Whether the account is inactive.
    pub inactive_flag: bool,
    /// When false, a password set here does not force a reset.
    pub password_reset_ok: bool,
    /// Groups the user belongs to.
    pub group_ids: Vec<Uuid>,
    /// Directly approved permission ids.
    pub approved_permission_ids: Vec<Uuid>,
    /// Directly denied permission ids.
    pub denied_permission_ids: Vec<Uuid>,
}

/// Result of a user creation: the stored row plus whether the welcome
/// notification went out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUser {
    /// The created user.
    pub user: User,
    /// Whether the welcome notification was accepted for delivery.
    pub notification_sent: bool,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        permission_repo: Arc<PermissionRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            user_repo,
            permission_repo,
            assignment_repo,
            hasher,
            validator,
            sender,
        }
    }

    /// Gets a user by id.
    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Lists users with pagination.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.user_repo.find_all(page).await
    }

    /// Creates a user with memberships and direct assignments.
    ///
    /// When no password is supplied, a random 8-character one is issued
    /// and carried in the welcome email. An administratively set
    /// password forces a reset on first login unless `password_reset_ok`
    /// is false. The notification is attempted only after the commit.
    pub async fn create(&self, req: CreateUserRequest) -> AppResult<CreatedUser> {
        let password = match &req.password {
            Some(password) => {
                self.validator.validate(password)?;
                password.clone()
            }
            None => random_alphanumeric(INITIAL_PASSWORD_LEN),
        };

        let hashed = self.hasher.hash_password(&password, None);
        let inactive_date = req.inactive_flag.then(Utc::now);

        let data = CreateUser {
            login_id: req.login_id,
            email_address: req.email_address,
            pass_hash: hashed.hash,
            pass_salt: hashed.salt,
            reset_required: req.password_reset_ok,
            super_user: req.super_user,
            name_first: req.name_first,
            name_last: req.name_last,
            inactive_flag: req.inactive_flag,
            inactive_date,
        };

        let user = self
            .user_repo
            .create_with_relations(
                &data,
                &req.group_ids,
                &req.approved_permission_ids,
                &req.denied_permission_ids,
            )
            .await?;

        info!(user_id = %user.id, login_id = %user.login_id, "User created");

        let context = NotificationContext {
            login_id: user.login_id.clone(),
            password: Some(password),
            reset_key: None,
        };
        let notification_sent = match self
            .sender
            .send(NotificationTemplate::NewUser, &user.email_address, context)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Welcome notification failed");
                false
            }
        };

        Ok(CreatedUser {
            user,
            notification_sent,
        })
    }

    /// Updates a user's profile, memberships, and direct assignments.
    ///
    /// A password supplied here is applied after the profile commit and
    /// forces a reset unless `password_reset_ok` is false.
    pub async fn update(&self, user_id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
        let mut user = self.get(user_id).await?;

        user.email_address = req.email_address;
        user.name_first = req.name_first;
        user.name_last = req.name_last;
        user.super_user = req.super_user;
        if req.inactive_flag && !user.inactive_flag {
            user.inactive_date = Some(Utc::now());
        } else if !req.inactive_flag {
            user.inactive_date = None;
        }
        user.inactive_flag = req.inactive_flag;

        let updated = self
            .user_repo
            .update_with_relations(
                &user,
                &req.group_ids,
                &req.approved_permission_ids,
                &req.denied_permission_ids,
            )
            .await?;

        if let Some(password) = &req.password {
            self.validator.validate(password)?;
            let hashed = self.hasher.hash_password(password, None);
            self.user_repo
                .update_password(user_id, &hashed.hash, &hashed.salt, req.password_reset_ok)
                .await?;

            let context = NotificationContext {
                login_id: updated.login_id.clone(),
                password: None,
                reset_key: None,
            };
            if let Err(e) = self
                .sender
                .send(
                    NotificationTemplate::ChangePassword,
                    &updated.email_address,
                    context,
                )
                .await
            {
                warn!(user_id = %user_id, error = %e, "Password change notification failed");
            }
        }

        info!(user_id = %user_id, "User updated");
        Ok(updated)
    }

    /// Deletes a user. Membership and assignment rows go with it; groups
    /// and permissions are untouched.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let deleted = self.user_repo.delete(user_id).await?;
        if deleted {
            info!(user_id = %user_id, "User deleted");
        }
        Ok(deleted)
    }

    /// The full diagnostic permission map: one row per known permission
    /// with the direct sign, group tallies, and the resulting approval.
    ///
    /// `apply_super_user = false` shows what a non-super account with the
    /// same assignments would get.
    pub async fn permission_map(
        &self,
        user_id: Uuid,
        apply_super_user: bool,
    ) -> AppResult<Vec<ResolvedPermission>> {
        let user = self.get(user_id).await?;

        let permissions = self.permission_repo.find_all().await?;
        let user_rows = self.assignment_repo.user_rows(user_id).await?;
        let group_rows = self.assignment_repo.group_rows_for_user(user_id).await?;

        let super_user = apply_super_user && user.super_user;
        Ok(resolve_permissions(
            &permissions,
            &user_rows,
            &group_rows,
            super_user,
        ))
    }

    /// Per-permission breakdown of which of the user's groups approve or
    /// deny it.
    pub async fn permission_map_groups(
        &self,
        user_id: Uuid,
    ) -> AppResult<HashMap<Uuid, GroupPermissionDetail>> {
        self.get(user_id).await?;

        let group_rows = self.assignment_repo.group_rows_for_user(user_id).await?;
        Ok(group_permission_detail(&group_rows))
    }
}
