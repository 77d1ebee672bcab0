//! Admission-controlled file service
//!
//! The three logical operations every gateway calls: upload, list, and
//! download, each gated by its traffic class budget.

pub mod operations;
pub mod results;

pub use operations::FileService;
pub use results::{DownloadResponse, FileMetadata, ListFilesResponse, UploadResponse};
