//! The permission resolution engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authhub_entity::assignment::{AssignmentRow, GroupAssignmentRow};
use authhub_entity::permission::Permission;

/// The resolved decision for one (user, permission) pair, with the raw
/// signals that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPermission {
    /// The permission's identifier.
    pub permission_id: Uuid,
    /// The permission's name.
    pub permission_name: String,
    /// The user's direct assignment sign, if any (+1 / -1).
    pub user_approved: Option<i16>,
    /// Sum of +1 per group approving the permission.
    pub group_approved: i64,
    /// Sum of -1 per group denying the permission (non-positive).
    pub group_denied: i64,
    /// The resulting approval after applying precedence.
    pub approved: bool,
}

/// Resolves the full permission set for one user.
///
/// Every permission in `permissions` yields exactly one output row, in
/// input order, even when no assignment anywhere references it — the
/// cross-product semantics callers rely on for diagnostic views.
///
/// `super_user` forces every row to approved; callers wanting the
/// "what would a normal user see" view pass `false` regardless of the
/// user's flag.
pub fn resolve_permissions(
    permissions: &[Permission],
    user_rows: &[AssignmentRow],
    group_rows: &[GroupAssignmentRow],
    super_user: bool,
) -> Vec<ResolvedPermission> {
    let direct: HashMap<Uuid, i16> = user_rows
        .iter()
        .map(|row| (row.permission_id, row.approved))
        .collect();

    let mut group_approved: HashMap<Uuid, i64> = HashMap::new();
    let mut group_denied: HashMap<Uuid, i64> = HashMap::new();
    for row in group_rows {
        if row.approved >= 1 {
            *group_approved.entry(row.permission_id).or_insert(0) += 1;
        } else if row.approved <= -1 {
            *group_denied.entry(row.permission_id).or_insert(0) -= 1;
        }
    }

    permissions
        .iter()
        .map(|permission| {
            let user_approved = direct.get(&permission.id).copied();
            let approved_count = group_approved.get(&permission.id).copied().unwrap_or(0);
            let denied_count = group_denied.get(&permission.id).copied().unwrap_or(0);

            let approved = if super_user {
                true
            } else {
                resulting_approval(user_approved, approved_count, denied_count)
            };

            ResolvedPermission {
                permission_id: permission.id,
                permission_name: permission.name.clone(),
                user_approved,
                group_approved: approved_count,
                group_denied: denied_count,
                approved,
            }
        })
        .collect()
}

/// Applies the precedence rules to one permission's raw signals.
fn resulting_approval(user_approved: Option<i16>, group_approved: i64, group_denied: i64) -> bool {
    match user_approved {
        Some(sign) if sign <= -1 => false,
        Some(sign) if sign >= 1 => true,
        _ => {
            if group_denied <= -1 {
                false
            } else {
                group_approved >= 1
            }
        }
    }
}
