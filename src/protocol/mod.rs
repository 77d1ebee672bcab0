//! RPC protocol implementation
//!
//! Line-framed command protocol carrying the three file operations.
//! Handles command parsing, dispatch to the file service, and replies.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus};
pub use handlers::{handle_command, handle_upload};
pub use parser::parse_command;
