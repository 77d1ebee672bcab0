//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::time::SystemTime;

/// Result of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAck {
    pub name: String,
    pub bytes_written: u64,
}

/// One entry of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileInfo {
    pub name: String,
    /// Also reported as the creation time; no separate creation time is kept
    pub modified: SystemTime,
}
