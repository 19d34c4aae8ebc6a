//! Group repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::assignment::SubjectKind;
use authhub_entity::group::Group;

use super::assignment::replace_assignments;
use super::membership::set_users_for_group;

/// Repository for group CRUD operations.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a group by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find group by id", e)
            })
    }

    /// Find a group by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find group by name", e)
            })
    }

    /// List all groups ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    /// Create a group.
    pub async fn create(&self, name: &str) -> AppResult<Group> {
        sqlx::query_as::<_, Group>("INSERT INTO groups (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_group_unique_violation(e, name))
    }

    /// Create a group together with its members and permission
    /// assignments, in one transaction.
    pub async fn create_with_relations(
        &self,
        name: &str,
        user_ids: &[Uuid],
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<Group> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let group =
            sqlx::query_as::<_, Group>("INSERT INTO groups (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_group_unique_violation(e, name))?;

        set_users_for_group(&mut tx, group.id, user_ids).await?;
        replace_assignments(&mut tx, SubjectKind::Group, group.id, approved, denied).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit group create", e)
        })?;

        Ok(group)
    }

    /// Rename a group and replace its members and assignments, in one
    /// transaction.
    pub async fn update_with_relations(
        &self,
        group_id: Uuid,
        name: &str,
        user_ids: &[Uuid],
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<Group> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let group = sqlx::query_as::<_, Group>(
            "UPDATE groups SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(group_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_group_unique_violation(e, name))?
        .ok_or_else(|| AppError::not_found(format!("Group {group_id} not found")))?;

        set_users_for_group(&mut tx, group_id, user_ids).await?;
        replace_assignments(&mut tx, SubjectKind::Group, group_id, approved, denied).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit group update", e)
        })?;

        Ok(group)
    }

    /// Rename a group.
    pub async fn rename(&self, group_id: Uuid, name: &str) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "UPDATE groups SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(group_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_group_unique_violation(e, name))?
        .ok_or_else(|| AppError::not_found(format!("Group {group_id} not found")))
    }

    /// Delete a group by ID. Membership and assignment rows cascade.
    pub async fn delete(&self, group_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete group", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_group_unique_violation(e: sqlx::Error, name: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                && db_err.constraint() == Some("groups_name_key") =>
        {
            AppError::conflict(format!("Group '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to write group", e),
    }
}
