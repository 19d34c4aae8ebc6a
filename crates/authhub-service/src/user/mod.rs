//! Administrative user management and permission diagnostics.

pub mod service;

pub use service::{CreateUserRequest, CreatedUser, UpdateUserRequest, UserService};
