//! Group management and name-based assignment operations.

pub mod service;

pub use service::GroupService;
