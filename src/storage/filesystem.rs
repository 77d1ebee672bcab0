//! File system bootstrap
//!
//! The storage root is created here, before any gateway is reachable. The
//! file store itself never creates it.

use log::info;
use std::fs;
use std::io;
use std::path::Path;

/// Create the storage root if needed and check that it is a directory
pub fn ensure_root(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)?;

    if !fs::metadata(path)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", path.display()),
        ));
    }

    info!("Storage root directory: {}", path.display());
    Ok(())
}
