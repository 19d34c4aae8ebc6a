//! Group operations — CRUD, membership, and the name-based assignment
//! wrappers used by provisioning scripts.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_database::repositories::assignment::AssignmentRepository;
use authhub_database::repositories::group::GroupRepository;
use authhub_database::repositories::membership::MembershipRepository;
use authhub_database::repositories::permission::PermissionRepository;
use authhub_entity::assignment::SubjectKind;
use authhub_entity::group::Group;
use authhub_entity::user::User;

/// Handles group management.
#[derive(Debug, Clone)]
pub struct GroupService {
    /// Group repository.
    group_repo: Arc<GroupRepository>,
    /// Permission repository, for name lookups.
    permission_repo: Arc<PermissionRepository>,
    /// Membership repository.
    membership_repo: Arc<MembershipRepository>,
    /// Assignment repository.
    assignment_repo: Arc<AssignmentRepository>,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(
        group_repo: Arc<GroupRepository>,
        permission_repo: Arc<PermissionRepository>,
        membership_repo: Arc<MembershipRepository>,
        assignment_repo: Arc<AssignmentRepository>,
    ) -> Self {
        Self {
            group_repo,
            permission_repo,
            membership_repo,
            assignment_repo,
        }
    }

    /// Gets a group by id.
    pub async fn get(&self, group_id: Uuid) -> AppResult<Group> {
        self.group_repo
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group {group_id} not found")))
    }

    /// Lists all groups ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Group>> {
        self.group_repo.find_all().await
    }

    /// Creates a group with members and permission assignments.
    pub async fn create(
        &self,
        name: &str,
        user_ids: &[Uuid],
        approved_permission_ids: &[Uuid],
        denied_permission_ids: &[Uuid],
    ) -> AppResult<Group> {
        let group = self
            .group_repo
            .create_with_relations(name, user_ids, approved_permission_ids, denied_permission_ids)
            .await?;

        info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    /// Creates the named group, or returns the existing one. Idempotent
    /// for provisioning scripts.
    pub async fn add_or_get(&self, name: &str) -> AppResult<Group> {
        match self.group_repo.create(name).await {
            Ok(group) => {
                info!(group_id = %group.id, name = %group.name, "Group created");
                Ok(group)
            }
            Err(e) if e.kind == ErrorKind::Conflict => self
                .group_repo
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Group '{name}' not found"))),
            Err(e) => Err(e),
        }
    }

    /// Renames a group and replaces its members and assignments.
    pub async fn update(
        &self,
        group_id: Uuid,
        name: &str,
        user_ids: &[Uuid],
        approved_permission_ids: &[Uuid],
        denied_permission_ids: &[Uuid],
    ) -> AppResult<Group> {
        let group = self
            .group_repo
            .update_with_relations(
                group_id,
                name,
                user_ids,
                approved_permission_ids,
                denied_permission_ids,
            )
            .await?;

        info!(group_id = %group_id, "Group updated");
        Ok(group)
    }

    /// Deletes a group. Membership and assignment rows go with it; users
    /// are untouched.
    pub async fn delete(&self, group_id: Uuid) -> AppResult<bool> {
        let deleted = self.group_repo.delete(group_id).await?;
        if deleted {
            info!(group_id = %group_id, "Group deleted");
        }
        Ok(deleted)
    }

    /// The users belonging to a group.
    pub async fn members(&self, group_id: Uuid) -> AppResult<Vec<User>> {
        self.get(group_id).await?;
        self.membership_repo.users_for_group(group_id).await
    }

    /// Adds a user to a group; a no-op when already a member.
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.membership_repo.add(user_id, group_id).await
    }

    /// Removes a user from a group; returns false when not a member.
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.membership_repo.remove(user_id, group_id).await
    }

    /// Replaces a group's assignments with the named permission sets.
    ///
    /// Every name must resolve to an existing permission.
    pub async fn assign_permissions_by_name(
        &self,
        group_name: &str,
        approved_names: &[&str],
        denied_names: &[&str],
    ) -> AppResult<()> {
        let group = self.find_by_name(group_name).await?;
        let approved = self.permission_ids_for_names(approved_names).await?;
        let denied = self.permission_ids_for_names(denied_names).await?;

        self.assignment_repo
            .replace_for(&group, &approved, &denied)
            .await?;

        info!(group_id = %group.id, "Group assignments replaced");
        Ok(())
    }

    /// Merges the named permission sets into a group's existing
    /// assignments. Nothing already assigned is removed.
    pub async fn add_permissions_to_existing(
        &self,
        group_name: &str,
        approved_names: &[&str],
        denied_names: &[&str],
    ) -> AppResult<()> {
        let group = self.find_by_name(group_name).await?;
        let new_approved = self.permission_ids_for_names(approved_names).await?;
        let new_denied = self.permission_ids_for_names(denied_names).await?;

        let (existing_approved, existing_denied) = self
            .assignment_repo
            .assigned_ids(SubjectKind::Group, group.id)
            .await?;

        let (approved, denied) = union_assignments(
            &existing_approved,
            &existing_denied,
            &new_approved,
            &new_denied,
        );

        self.assignment_repo
            .replace_for(&group, &approved, &denied)
            .await?;

        info!(group_id = %group.id, "Group assignments extended");
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Group> {
        self.group_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Group '{name}' not found")))
    }

    async fn permission_ids_for_names(&self, names: &[&str]) -> AppResult<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let permission = self
                .permission_repo
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Permission '{name}' not found")))?;
            ids.push(permission.id);
        }
        Ok(ids)
    }
}

/// Set-union merge of existing and new assignment id lists, preserving
/// first-seen order and deduplicating.
fn union_assignments(
    existing_approved: &[Uuid],
    existing_denied: &[Uuid],
    new_approved: &[Uuid],
    new_denied: &[Uuid],
) -> (Vec<Uuid>, Vec<Uuid>) {
    (
        union_ids(existing_approved, new_approved),
        union_ids(existing_denied, new_denied),
    )
}

fn union_ids(existing: &[Uuid], new: &[Uuid]) -> Vec<Uuid> {
    let mut merged = Vec::with_capacity(existing.len() + new.len());
    for id in existing.iter().chain(new) {
        if !merged.contains(id) {
            merged.push(*id);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_keeps_existing_and_adds_new() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let (approved, denied) = union_assignments(&[a], &[b], &[c], &[]);

        assert_eq!(approved, vec![a, c]);
        assert_eq!(denied, vec![b]);
    }

    #[test]
    fn test_union_deduplicates_overlap() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let (approved, denied) = union_assignments(&[a, b], &[], &[b, a], &[a]);

        assert_eq!(approved, vec![a, b]);
        // The resulting overlap across sets is resolved at insert time,
        // where the deny row wins.
        assert_eq!(denied, vec![a]);
    }

    #[test]
    fn test_union_with_empty_existing() {
        let a = Uuid::new_v4();

        let (approved, denied) = union_assignments(&[], &[], &[a], &[]);

        assert_eq!(approved, vec![a]);
        assert!(denied.is_empty());
    }
}
