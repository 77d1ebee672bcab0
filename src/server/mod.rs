//! Server core functionality
//!
//! The RPC listener, its accept loop, and the process bootstrap that wires
//! storage, admission, and both gateways together.

pub mod core;

pub use self::core::{Server, run};
