//! Permission repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::permission::Permission;

/// Repository for the permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a permission by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find permission by id", e)
            })
    }

    /// Find a permission by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find permission by name", e)
            })
    }

    /// List the full permission catalog ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list permissions", e)
            })
    }

    /// Create a permission.
    pub async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_permission_unique_violation(e, name))
    }

    /// Update a permission's description.
    pub async fn update_description(
        &self,
        permission_id: Uuid,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET description = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(permission_id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update permission", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Permission {permission_id} not found")))
    }

    /// Delete a permission by ID. Assignment rows cascade.
    pub async fn delete(&self, permission_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(permission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete permission", e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_permission_unique_violation(e: sqlx::Error, name: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                && db_err.constraint() == Some("permissions_name_key") =>
        {
            AppError::conflict(format!("Permission '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to write permission", e),
    }
}
