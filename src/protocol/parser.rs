//! Command parsing
//!
//! Re-exports the parser from `commands` so callers need not know where it
//! lives.

pub use crate::protocol::commands::parse_command;
