//! Password reset key lifecycle helpers.

pub mod key;

pub use key::{RESET_KEY_LEN, generate_reset_key, is_reset_expired};
