//! Repository implementations for all AuthHub entities.

pub mod assignment;
pub mod group;
pub mod membership;
pub mod permission;
pub mod user;

pub use assignment::AssignmentRepository;
pub use group::GroupRepository;
pub use membership::MembershipRepository;
pub use permission::PermissionRepository;
pub use user::UserRepository;
