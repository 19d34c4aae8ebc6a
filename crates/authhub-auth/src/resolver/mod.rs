//! Pure permission resolution over raw assignment rows.
//!
//! Resolution precedence (first match wins):
//! 1. Direct user denial -> denied.
//! 2. Direct user approval -> approved.
//! 3. Any group denial -> denied (overrides group approvals).
//! 4. Any group approval -> approved.
//! 5. Otherwise -> denied (default-deny).
//!
//! A super user is approved for every permission regardless, unless the
//! caller evaluates with the override disabled for diagnostic views.

pub mod engine;
pub mod groups;

pub use engine::{ResolvedPermission, resolve_permissions};
pub use groups::{GroupPermissionDetail, GroupRef, group_permission_detail};
