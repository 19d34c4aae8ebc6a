//! Authentication and password lifecycle.

pub mod service;

pub use service::AuthService;
