//! Password hashing and policy enforcement.

pub mod hasher;
pub mod validator;

pub use hasher::{HashedPassword, PasswordHasher};
pub use validator::PasswordValidator;
