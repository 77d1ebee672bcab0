//! File system storage management
//!
//! Handles the flat storage directory: whole-file writes, reads, and
//! enumeration, plus name validation and root bootstrap.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use filesystem::ensure_root;
pub use operations::FileStore;
pub use results::{StoreAck, StoredFileInfo};
pub use validation::{STAGING_DIR, validate_file_name};
