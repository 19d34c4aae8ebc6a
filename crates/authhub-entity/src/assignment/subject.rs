//! The subject abstraction: anything that can own permission assignments.
//!
//! Users and groups hold assignments in structurally identical tables, so
//! the assignment store is written once against [`SubjectKind`] instead of
//! being duplicated per entity.

use uuid::Uuid;

use crate::group::Group;
use crate::user::User;

/// The two kinds of assignment subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    /// A user-scoped assignment.
    User,
    /// A group-scoped assignment.
    Group,
}

impl SubjectKind {
    /// The assignment table for this subject kind.
    pub fn assignment_table(&self) -> &'static str {
        match self {
            Self::User => "user_permission_assignments",
            Self::Group => "group_permission_assignments",
        }
    }

    /// The subject foreign-key column in the assignment table.
    pub fn subject_column(&self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Group => "group_id",
        }
    }

    /// The table holding the subject entity itself.
    pub fn entity_table(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
        }
    }

    /// A short label for log messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

/// An entity that can hold permission assignments.
pub trait Subject {
    /// Which assignment table the subject's rows live in.
    const KIND: SubjectKind;

    /// The subject's identifier.
    fn subject_id(&self) -> Uuid;
}

impl Subject for User {
    const KIND: SubjectKind = SubjectKind::User;

    fn subject_id(&self) -> Uuid {
        self.id
    }
}

impl Subject for Group {
    const KIND: SubjectKind = SubjectKind::Group;

    fn subject_id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(
            SubjectKind::User.assignment_table(),
            "user_permission_assignments"
        );
        assert_eq!(SubjectKind::Group.subject_column(), "group_id");
        assert_eq!(SubjectKind::User.entity_table(), "users");
        assert_eq!(SubjectKind::Group.entity_table(), "groups");
    }
}
