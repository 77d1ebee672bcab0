//! Browser gateway
//!
//! An optional HTTP front end: a file list page with download links, a
//! multipart upload form, and a JSON listing, all served through the same
//! admission-controlled file service as the RPC gateway.

pub mod page;
pub mod routes;

pub use routes::{WebState, router, serve};
