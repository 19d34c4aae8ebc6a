//! Group membership repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::group::Group;
use authhub_entity::user::User;

/// Repository for the user/group membership relation.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a user to a group. Adding an existing member is a no-op.
    pub async fn add(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_group_map (user_id, group_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await
        .map_err(map_membership_error)?;
        Ok(())
    }

    /// Remove a user from a group. Returns false when the user was not
    /// a member.
    pub async fn remove(&self, user_id: Uuid, group_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM user_group_map WHERE user_id = $1 AND group_id = $2")
                .bind(user_id)
                .bind(group_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove membership", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// The groups a user belongs to, ordered by name.
    pub async fn groups_for_user(&self, user_id: Uuid) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT g.* FROM groups g \
             JOIN user_group_map ugm ON ugm.group_id = g.id \
             WHERE ugm.user_id = $1 \
             ORDER BY g.name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load groups for user", e)
        })
    }

    /// The users belonging to a group, ordered by login id.
    pub async fn users_for_group(&self, group_id: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN user_group_map ugm ON ugm.user_id = u.id \
             WHERE ugm.group_id = $1 \
             ORDER BY u.login_id ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load users for group", e)
        })
    }

    /// The ids of groups a user belongs to.
    pub async fn group_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT group_id FROM user_group_map WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load group ids", e)
            })
    }

    /// The ids of users belonging to a group.
    pub async fn user_ids_for_group(&self, group_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT user_id FROM user_group_map WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load user ids", e)
            })
    }

    /// Atomically replace the full set of groups a user belongs to.
    pub async fn set_groups(&self, user_id: Uuid, group_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        set_groups_for_user(&mut tx, user_id, group_ids).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit membership replace", e)
        })
    }

    /// Atomically replace the full set of users belonging to a group.
    pub async fn set_users(&self, group_id: Uuid, user_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        set_users_for_group(&mut tx, group_id, user_ids).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit membership replace", e)
        })
    }
}

/// Delete-then-insert replace of one user's memberships, on an open
/// transaction.
pub(crate) async fn set_groups_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    group_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM user_group_map WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to clear memberships", e)
        })?;

    for group_id in group_ids {
        sqlx::query(
            "INSERT INTO user_group_map (user_id, group_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&mut *conn)
        .await
        .map_err(map_membership_error)?;
    }

    Ok(())
}

/// Delete-then-insert replace of one group's members, on an open
/// transaction.
pub(crate) async fn set_users_for_group(
    conn: &mut PgConnection,
    group_id: Uuid,
    user_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM user_group_map WHERE group_id = $1")
        .bind(group_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to clear memberships", e)
        })?;

    for user_id in user_ids {
        sqlx::query(
            "INSERT INTO user_group_map (user_id, group_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&mut *conn)
        .await
        .map_err(map_membership_error)?;
    }

    Ok(())
}

fn map_membership_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found("User or group does not exist")
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to insert membership", e),
    }
}
