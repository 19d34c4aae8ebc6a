//! # authhub-entity
//!
//! Domain entity models and enums for AuthHub: users, groups, permissions,
//! and permission assignment rows shared by the database and service
//! layers.

pub mod assignment;
pub mod group;
pub mod permission;
pub mod user;

pub use assignment::{Approval, AssignmentRow, GroupAssignmentRow, Subject, SubjectKind};
pub use group::Group;
pub use permission::Permission;
pub use user::User;
