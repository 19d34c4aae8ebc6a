//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_core::types::pagination::{PageRequest, PageResponse};
use authhub_entity::assignment::SubjectKind;
use authhub_entity::user::{CreateUser, User};

use super::assignment::replace_assignments;
use super::membership::set_groups_for_user;

/// Repository for user CRUD, credential, and reset-key operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by exact login id.
    pub async fn find_by_login(&self, login_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE login_id = $1")
            .bind(login_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by login", e)
            })
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email_address: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email_address) = LOWER($1)")
            .bind(email_address)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// List all users with pagination, ordered by login id.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY login_id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Create a user together with its group memberships and direct
    /// permission assignments, in one transaction.
    pub async fn create_with_relations(
        &self,
        data: &CreateUser,
        group_ids: &[Uuid],
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (login_id, email_address, pass_hash, pass_salt, \
                                reset_required, super_user, name_first, name_last, \
                                inactive_flag, inactive_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(&data.login_id)
        .bind(&data.email_address)
        .bind(&data.pass_hash)
        .bind(&data.pass_salt)
        .bind(data.reset_required)
        .bind(data.super_user)
        .bind(&data.name_first)
        .bind(&data.name_last)
        .bind(data.inactive_flag)
        .bind(data.inactive_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_user_unique_violation(e, &data.login_id))?;

        set_groups_for_user(&mut tx, user.id, group_ids).await?;
        replace_assignments(&mut tx, SubjectKind::User, user.id, approved, denied).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit user create", e)
        })?;

        Ok(user)
    }

    /// Update a user's profile fields together with its group memberships
    /// and direct assignments, in one transaction. The full desired sets
    /// are applied; omitted relations are removed.
    pub async fn update_with_relations(
        &self,
        user: &User,
        group_ids: &[Uuid],
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET email_address = $2, name_first = $3, name_last = $4, \
                              super_user = $5, inactive_flag = $6, inactive_date = $7, \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&user.email_address)
        .bind(&user.name_first)
        .bind(&user.name_last)
        .bind(user.super_user)
        .bind(user.inactive_flag)
        .bind(user.inactive_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_user_unique_violation(e, &user.login_id))?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;

        set_groups_for_user(&mut tx, user.id, group_ids).await?;
        replace_assignments(&mut tx, SubjectKind::User, user.id, approved, denied).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit user update", e)
        })?;

        Ok(updated)
    }

    /// Replace a user's password material and reset-required flag.
    pub async fn update_password(
        &self,
        user_id: Uuid,
        pass_hash: &str,
        pass_salt: &str,
        reset_required: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET pass_hash = $2, pass_salt = $3, reset_required = $4, \
                              updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(pass_hash)
        .bind(pass_salt)
        .bind(reset_required)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Store a pending reset key and its issuance timestamp, overwriting
    /// any previously pending key.
    pub async fn set_reset_key(
        &self,
        user_id: Uuid,
        key: &str,
        issued_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET pass_reset_key = $2, pass_reset_ts = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(key)
        .bind(issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set reset key", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Clear any pending reset key and timestamp.
    pub async fn clear_reset_key(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET pass_reset_key = NULL, pass_reset_ts = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear reset key", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Atomically set the new password and clear the reset key, used when
    /// a reset key is consumed.
    pub async fn consume_reset(
        &self,
        user_id: Uuid,
        pass_hash: &str,
        pass_salt: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET pass_hash = $2, pass_salt = $3, reset_required = FALSE, \
                              pass_reset_key = NULL, pass_reset_ts = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(pass_hash)
        .bind(pass_salt)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to consume reset key", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Delete a user by ID. Membership and assignment rows cascade; no
    /// group or permission entity is touched.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count total users.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(count as u64)
    }
}

/// Map unique-constraint violations on the users table to `Conflict`.
fn map_user_unique_violation(e: sqlx::Error, login_id: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some("users_login_id_key") => {
                    AppError::conflict(format!("Login id '{login_id}' already exists"))
                }
                Some("users_email_address_lower_key") => {
                    AppError::conflict("Email address already in use")
                }
                _ => AppError::conflict("User violates a unique constraint"),
            }
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to write user", e),
    }
}
