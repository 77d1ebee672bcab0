//! Error handling
//!
//! Defines error types for admission, storage, and the server shell, and
//! maps them onto gateway reply codes.

pub mod handlers;
pub mod types;

pub use types::*;
