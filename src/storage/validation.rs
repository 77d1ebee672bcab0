//! Name validation
//!
//! Names are storage keys used verbatim. A name is accepted only if it
//! denotes a direct child of the storage root.

use crate::error::StorageError;

/// Hidden subdirectory of the root holding uploads still being written.
pub const STAGING_DIR: &str = ".incoming";

/// Rejects names that cannot be a plain entry directly under the root.
pub fn validate_file_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name == STAGING_DIR
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
