//! RAX File Server
//!
//! A remote file repository over a single flat directory. Uploads, listings,
//! and downloads pass through an admission controller that bounds concurrent
//! transfer and listing work before anything touches the filesystem.

pub mod admission;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;
pub mod web;

pub use server::Server;
pub use service::FileService;
