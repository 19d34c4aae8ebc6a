//! Per-permission breakdown of which groups approved or denied.
//!
//! Backs the administrative "why is this approved/denied" view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authhub_entity::assignment::GroupAssignmentRow;

/// A group reference carried in diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    /// The group's identifier.
    pub id: Uuid,
    /// The group's name.
    pub name: String,
}

/// The groups approving and denying one permission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupPermissionDetail {
    /// Groups whose assignment approves the permission.
    pub approved: Vec<GroupRef>,
    /// Groups whose assignment denies the permission.
    pub denied: Vec<GroupRef>,
}

/// Buckets group assignment rows by permission into approver/denier lists.
pub fn group_permission_detail(
    group_rows: &[GroupAssignmentRow],
) -> HashMap<Uuid, GroupPermissionDetail> {
    let mut detail: HashMap<Uuid, GroupPermissionDetail> = HashMap::new();
    for row in group_rows {
        let entry = detail.entry(row.permission_id).or_default();
        let group = GroupRef {
            id: row.group_id,
            name: row.group_name.clone(),
        };
        if row.approved <= -1 {
            entry.denied.push(group);
        } else if row.approved >= 1 {
            entry.approved.push(group);
        }
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, permission_id: Uuid, approved: i16) -> GroupAssignmentRow {
        GroupAssignmentRow {
            group_id: Uuid::new_v4(),
            group_name: name.to_string(),
            permission_id,
            approved,
        }
    }

    #[test]
    fn test_buckets_by_sign() {
        let perm = Uuid::new_v4();
        let rows = vec![
            row("editors", perm, 1),
            row("auditors", perm, -1),
            row("admins", perm, 1),
        ];
        let detail = group_permission_detail(&rows);
        let entry = &detail[&perm];
        assert_eq!(entry.approved.len(), 2);
        assert_eq!(entry.denied.len(), 1);
        assert_eq!(entry.denied[0].name, "auditors");
    }

    #[test]
    fn test_permissions_are_independent() {
        let perm_a = Uuid::new_v4();
        let perm_b = Uuid::new_v4();
        let rows = vec![row("editors", perm_a, 1), row("editors", perm_b, -1)];
        let detail = group_permission_detail(&rows);
        assert_eq!(detail[&perm_a].approved.len(), 1);
        assert!(detail[&perm_a].denied.is_empty());
        assert_eq!(detail[&perm_b].denied.len(), 1);
    }
}
