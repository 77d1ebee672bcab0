//! Service result types
//!
//! Transport-independent responses of the file service.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::time::SystemTime;

use crate::storage::StoredFileInfo;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub message: String,
}

/// Listing entry. Both timestamps come from the modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    pub content: Vec<u8>,
}

impl From<StoredFileInfo> for FileMetadata {
    fn from(info: StoredFileInfo) -> Self {
        let timestamp = format_timestamp(info.modified);
        Self {
            name: info.name,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

/// RFC 3339 in UTC, second precision
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
