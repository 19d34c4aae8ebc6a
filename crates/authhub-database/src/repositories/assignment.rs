//! Permission assignment repository.
//!
//! One implementation serves both user- and group-scoped assignments;
//! [`SubjectKind`] selects the table and foreign-key column. The replace
//! operation is delete-then-insert inside a single transaction so a
//! concurrent reader never observes the emptied state.

use std::collections::HashSet;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::assignment::{
    Approval, AssignmentRow, GroupAssignmentRow, Subject, SubjectKind,
};

/// Repository for approve/deny assignment rows.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically replace all assignment rows for a subject with the
    /// given approved and denied permission sets.
    ///
    /// Fails with `NotFound` when the subject does not exist, even for
    /// an all-empty replace that would otherwise touch no rows.
    pub async fn replace(
        &self,
        kind: SubjectKind,
        subject_id: Uuid,
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        ensure_subject_exists(&mut tx, kind, subject_id).await?;
        replace_assignments(&mut tx, kind, subject_id, approved, denied).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit assignment replace", e)
        })
    }

    /// Typed variant of [`replace`](Self::replace) for a loaded subject.
    pub async fn replace_for<S: Subject>(
        &self,
        subject: &S,
        approved: &[Uuid],
        denied: &[Uuid],
    ) -> AppResult<()> {
        self.replace(S::KIND, subject.subject_id(), approved, denied)
            .await
    }

    /// The subject's currently assigned permission ids, split into
    /// (approved, denied).
    pub async fn assigned_ids(
        &self,
        kind: SubjectKind,
        subject_id: Uuid,
    ) -> AppResult<(Vec<Uuid>, Vec<Uuid>)> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT permission_id, approved FROM {} WHERE {} = $1",
            kind.assignment_table(),
            kind.subject_column(),
        ))
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load assignments", e)
        })?;

        Ok(partition_by_sign(&rows))
    }

    /// A user's direct assignment rows.
    pub async fn user_rows(&self, user_id: Uuid) -> AppResult<Vec<AssignmentRow>> {
        sqlx::query_as::<_, AssignmentRow>(
            "SELECT permission_id, approved FROM user_permission_assignments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load user assignments", e)
        })
    }

    /// All group assignment rows touching any group the user belongs to,
    /// carrying the group id and name for diagnostic views.
    pub async fn group_rows_for_user(&self, user_id: Uuid) -> AppResult<Vec<GroupAssignmentRow>> {
        sqlx::query_as::<_, GroupAssignmentRow>(
            "SELECT g.id AS group_id, g.name AS group_name, \
                    gpa.permission_id, gpa.approved \
             FROM group_permission_assignments gpa \
             JOIN groups g ON g.id = gpa.group_id \
             JOIN user_group_map ugm ON ugm.group_id = g.id \
             WHERE ugm.user_id = $1 \
             ORDER BY g.name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load group assignments", e)
        })
    }
}

/// Fails `NotFound` unless the subject row exists.
///
/// The insert-path FK check only fires when there is something to
/// insert, so an empty replace needs this explicit probe.
async fn ensure_subject_exists(
    conn: &mut PgConnection,
    kind: SubjectKind,
    subject_id: Uuid,
) -> AppResult<()> {
    let found: Option<i32> = sqlx::query_scalar(&format!(
        "SELECT 1 FROM {} WHERE id = $1",
        kind.entity_table(),
    ))
    .bind(subject_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to check subject existence", e)
    })?;

    if found.is_none() {
        return Err(AppError::not_found(format!(
            "Cannot replace assignments: {} {subject_id} does not exist",
            kind.label(),
        )));
    }
    Ok(())
}

/// Delete-then-insert replace for one subject, on an open transaction.
///
/// A permission id present in both sets is inserted once, as denied.
pub(crate) async fn replace_assignments(
    conn: &mut PgConnection,
    kind: SubjectKind,
    subject_id: Uuid,
    approved: &[Uuid],
    denied: &[Uuid],
) -> AppResult<()> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        kind.assignment_table(),
        kind.subject_column(),
    ))
    .bind(subject_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to clear assignments", e)
    })?;

    let denied_set: HashSet<Uuid> = denied.iter().copied().collect();
    let insert_sql = format!(
        "INSERT INTO {} ({}, permission_id, approved) VALUES ($1, $2, $3)",
        kind.assignment_table(),
        kind.subject_column(),
    );

    for permission_id in approved.iter().filter(|id| !denied_set.contains(id)) {
        insert_assignment(
            conn,
            &insert_sql,
            kind,
            subject_id,
            *permission_id,
            Approval::Approved,
        )
        .await?;
    }
    for permission_id in denied {
        insert_assignment(
            conn,
            &insert_sql,
            kind,
            subject_id,
            *permission_id,
            Approval::Denied,
        )
        .await?;
    }

    Ok(())
}

async fn insert_assignment(
    conn: &mut PgConnection,
    insert_sql: &str,
    kind: SubjectKind,
    subject_id: Uuid,
    permission_id: Uuid,
    approval: Approval,
) -> AppResult<()> {
    sqlx::query(insert_sql)
        .bind(subject_id)
        .bind(permission_id)
        .bind(approval.sign())
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!(
                    "Cannot assign permission {permission_id}: {} {subject_id} or the permission does not exist",
                    kind.label(),
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert assignment", e),
        })
        .map(|_| ())
}

/// Split assignment rows into (approved, denied) permission id lists.
fn partition_by_sign(rows: &[AssignmentRow]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut approved = Vec::new();
    let mut denied = Vec::new();
    for row in rows {
        if row.approved >= 1 {
            approved.push(row.permission_id);
        } else {
            denied.push(row.permission_id);
        }
    }
    (approved, denied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_by_sign() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let rows = vec![
            AssignmentRow {
                permission_id: a,
                approved: 1,
            },
            AssignmentRow {
                permission_id: b,
                approved: -1,
            },
            AssignmentRow {
                permission_id: c,
                approved: 1,
            },
        ];
        let (approved, denied) = partition_by_sign(&rows);
        assert_eq!(approved, vec![a, c]);
        assert_eq!(denied, vec![b]);
    }
}
