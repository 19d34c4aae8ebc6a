//! # authhub-auth
//!
//! Credential and authorization logic for AuthHub: password hashing and
//! salting, password policy, reset-key lifecycle helpers, and the pure
//! permission resolver.
//!
//! Everything in this crate is side-effect free; persistence lives in
//! `authhub-database` and orchestration in `authhub-service`.

pub mod password;
pub mod random;
pub mod reset;
pub mod resolver;

pub use password::{HashedPassword, PasswordHasher, PasswordValidator};
pub use resolver::{GroupPermissionDetail, ResolvedPermission, resolve_permissions};
