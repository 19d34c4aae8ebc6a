//! Permission catalog operations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_database::repositories::permission::PermissionRepository;
use authhub_entity::permission::Permission;

/// Handles the permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Permission repository.
    permission_repo: Arc<PermissionRepository>,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(permission_repo: Arc<PermissionRepository>) -> Self {
        Self { permission_repo }
    }

    /// Gets a permission by id.
    pub async fn get(&self, permission_id: Uuid) -> AppResult<Permission> {
        self.permission_repo
            .find_by_id(permission_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {permission_id} not found")))
    }

    /// Lists the full catalog ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Permission>> {
        self.permission_repo.find_all().await
    }

    /// Creates the named permission, or returns the existing one.
    /// Idempotent for provisioning scripts; an existing row's
    /// description is left as-is.
    pub async fn add_or_get(&self, name: &str, description: Option<&str>) -> AppResult<Permission> {
        match self.permission_repo.create(name, description).await {
            Ok(permission) => {
                info!(permission_id = %permission.id, name = %permission.name, "Permission created");
                Ok(permission)
            }
            Err(e) if e.kind == ErrorKind::Conflict => self
                .permission_repo
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Permission '{name}' not found"))),
            Err(e) => Err(e),
        }
    }

    /// Updates a permission's description.
    pub async fn update_description(
        &self,
        permission_id: Uuid,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.permission_repo
            .update_description(permission_id, description)
            .await
    }

    /// Deletes a permission. Assignment rows referencing it go with it.
    pub async fn delete(&self, permission_id: Uuid) -> AppResult<bool> {
        let deleted = self.permission_repo.delete(permission_id).await?;
        if deleted {
            info!(permission_id = %permission_id, "Permission deleted");
        }
        Ok(deleted)
    }
}
