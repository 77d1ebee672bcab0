//! Client connection handling
//!
//! Runs one RPC session per accepted connection.

pub mod handler;

pub use handler::handle_client;
