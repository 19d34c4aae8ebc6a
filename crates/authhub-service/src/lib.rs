//! # authhub-service
//!
//! Business logic service layer for AuthHub. Each service orchestrates
//! repositories and credential logic to implement application-level use
//! cases: authentication, the password reset flow, administrative user
//! and group management, and permission resolution.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod context;
pub mod group;
pub mod notify;
pub mod permission;
pub mod user;

pub use auth::AuthService;
pub use context::SessionUser;
pub use group::GroupService;
pub use notify::{NoopSender, NotificationContext, NotificationSender, NotificationTemplate};
pub use permission::PermissionService;
pub use user::UserService;
