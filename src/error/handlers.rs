//! Error handlers
//!
//! Maps file service errors onto gateway signals and logs them.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::{ErrorKind, FileServiceError};
use crate::protocol::responses;

/// Log a failed file operation at a level matching its kind
pub fn handle_error(operation: &str, target: &str, err: &FileServiceError) {
    match err.kind() {
        ErrorKind::Overloaded => warn!("{} {:?} rejected: {}", operation, target, err),
        ErrorKind::NotFound => warn!("{} {:?} failed: {}", operation, target, err),
        ErrorKind::IoFailure => error!("{} {:?} failed: {}", operation, target, err),
    }
}

/// Convert error to RPC reply code
pub fn error_to_reply_code(err: &FileServiceError) -> u16 {
    match err.kind() {
        ErrorKind::Overloaded => responses::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => responses::FILE_NOT_FOUND,
        ErrorKind::IoFailure => responses::LOCAL_ERROR,
    }
}

/// Convert error to HTTP status for the browser gateway
pub fn error_to_status(err: &FileServiceError) -> StatusCode {
    match err.kind() {
        ErrorKind::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::IoFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn each_kind_gets_a_distinct_signal() {
        let not_found = FileServiceError::from(StorageError::FileNotFound("x".into()));
        let io = FileServiceError::TaskFailed("boom".into());
        assert_eq!(error_to_reply_code(&not_found), 550);
        assert_eq!(error_to_reply_code(&io), 451);
        assert_eq!(error_to_status(&not_found), StatusCode::NOT_FOUND);
        assert_eq!(error_to_status(&io), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
