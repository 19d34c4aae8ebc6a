//! Assignment row models.
//!
//! A permission assignment is a `(subject, permission, sign)` tuple where
//! the sign is +1 (approved) or -1 (denied). Absence of a row means the
//! subject expresses no opinion on that permission.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use authhub_core::AppError;

/// The sign of a permission assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    /// The subject is explicitly approved for the permission (+1).
    Approved,
    /// The subject is explicitly denied the permission (-1).
    Denied,
}

impl Approval {
    /// The smallint value stored in the assignment tables.
    pub fn sign(&self) -> i16 {
        match self {
            Self::Approved => 1,
            Self::Denied => -1,
        }
    }

    /// Parse a stored sign back into an `Approval`.
    pub fn from_sign(sign: i16) -> Result<Self, AppError> {
        match sign {
            1 => Ok(Self::Approved),
            -1 => Ok(Self::Denied),
            other => Err(AppError::validation(format!(
                "Invalid assignment sign: {other}. Expected 1 or -1"
            ))),
        }
    }
}

/// A direct assignment row for a single subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentRow {
    /// The permission being approved or denied.
    pub permission_id: Uuid,
    /// The assignment sign: +1 approved, -1 denied.
    pub approved: i16,
}

/// A group-scoped assignment row joined through a user's memberships.
///
/// One row per `(group, permission)` assignment touching any group the
/// user belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupAssignmentRow {
    /// The group holding the assignment.
    pub group_id: Uuid,
    /// The group's name (for diagnostic views).
    pub group_name: String,
    /// The permission being approved or denied.
    pub permission_id: Uuid,
    /// The assignment sign: +1 approved, -1 denied.
    pub approved: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_round_trip() {
        assert_eq!(Approval::from_sign(1).unwrap(), Approval::Approved);
        assert_eq!(Approval::from_sign(-1).unwrap(), Approval::Denied);
        assert_eq!(Approval::Approved.sign(), 1);
        assert_eq!(Approval::Denied.sign(), -1);
    }

    #[test]
    fn test_invalid_sign_rejected() {
        assert!(Approval::from_sign(0).is_err());
        assert!(Approval::from_sign(2).is_err());
    }
}
