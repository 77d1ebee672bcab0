//! Error types
//!
//! Defines domain-specific error types for each layer of the file server.
//! Every failure a caller can see classifies into one [`ErrorKind`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::admission::TrafficClass;

/// Classification surfaced to callers of the file service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Admission budget exhausted or the caller gave up waiting. Retryable.
    Overloaded,
    /// Requested name absent. Terminal for that request.
    NotFound,
    /// Underlying storage malfunction. May be transient.
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Overloaded => write!(f, "overloaded"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::IoFailure => write!(f, "I/O failure"),
        }
    }
}

/// Admission module errors
#[derive(Debug)]
pub enum AdmissionError {
    /// The caller's cancellation signal fired while waiting for a slot
    Overloaded { class: TrafficClass, capacity: usize },
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::Overloaded { class, capacity } => write!(
                f,
                "too many concurrent {} operations (limit {}); gave up waiting",
                class, capacity
            ),
        }
    }
}

impl std::error::Error for AdmissionError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    InvalidName(String),
    RootUnreadable { root: PathBuf, source: io::Error },
    WriteFailed { name: String, source: io::Error },
    ReadFailed { name: String, source: io::Error },
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::FileNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::IoFailure,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "file \"{}\" not found", name),
            StorageError::InvalidName(name) => {
                write!(f, "invalid file name {:?}: not a plain entry name", name)
            }
            StorageError::RootUnreadable { root, source } => {
                write!(f, "failed to list files in {}: {}", root.display(), source)
            }
            StorageError::WriteFailed { name, source } => {
                write!(f, "failed to upload file \"{}\": {}", name, source)
            }
            StorageError::ReadFailed { name, source } => {
                write!(f, "failed to read file \"{}\": {}", name, source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::RootUnreadable { source, .. }
            | StorageError::WriteFailed { source, .. }
            | StorageError::ReadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors returned by the admission-controlled file service
#[derive(Debug)]
pub enum FileServiceError {
    Admission(AdmissionError),
    Storage(StorageError),
    /// The task running the admitted store operation panicked or was aborted
    TaskFailed(String),
}

impl FileServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileServiceError::Admission(_) => ErrorKind::Overloaded,
            FileServiceError::Storage(e) => e.kind(),
            FileServiceError::TaskFailed(_) => ErrorKind::IoFailure,
        }
    }
}

impl fmt::Display for FileServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileServiceError::Admission(e) => write!(f, "{}", e),
            FileServiceError::Storage(e) => write!(f, "{}", e),
            FileServiceError::TaskFailed(e) => write!(f, "storage task failed: {}", e),
        }
    }
}

impl std::error::Error for FileServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileServiceError::Admission(e) => Some(e),
            FileServiceError::Storage(e) => Some(e),
            FileServiceError::TaskFailed(_) => None,
        }
    }
}

impl From<AdmissionError> for FileServiceError {
    fn from(error: AdmissionError) -> Self {
        FileServiceError::Admission(error)
    }
}

impl From<StorageError> for FileServiceError {
    fn from(error: StorageError) -> Self {
        FileServiceError::Storage(error)
    }
}

/// Process-level errors raised while bootstrapping or serving
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Bind { addr: String, source: io::Error },
    StorageRoot { root: PathBuf, source: io::Error },
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Bind { addr, source } => write!(f, "Failed to bind {}: {}", addr, source),
            ServerError::StorageRoot { root, source } => write!(
                f,
                "Failed to prepare storage directory {}: {}",
                root.display(),
                source
            ),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}
