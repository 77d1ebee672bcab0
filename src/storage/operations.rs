//! Storage operations
//!
//! Handles whole-file put, get, and list against the storage root. Callers
//! must hold an admission permit for the operation's traffic class.

use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;
use crate::storage::results::{StoreAck, StoredFileInfo};
use crate::storage::validation::{STAGING_DIR, validate_file_name};

/// File store rooted at one flat directory.
///
/// Uploads are written to a staging file under [`STAGING_DIR`], synced, and
/// renamed over the target, so readers see either the previous content or
/// the complete new content. Concurrent uploads to one name: the last rename
/// wins.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    staging_seq: AtomicU64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staging_seq: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` under `name`, replacing any previous entry.
    pub async fn put(&self, name: &str, content: &[u8]) -> Result<StoreAck, StorageError> {
        validate_file_name(name)?;

        let final_path = self.root.join(name);
        let (temp_path, temp_file) =
            self.create_staging().await.map_err(|e| StorageError::WriteFailed {
                name: name.to_string(),
                source: e,
            })?;

        debug!(
            "Starting upload: {} -> {}",
            temp_path.display(),
            final_path.display()
        );

        if let Err(e) = write_synced(temp_file, content).await {
            error!("Failed to write staging file {}: {}", temp_path.display(), e);
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed {
                name: name.to_string(),
                source: e,
            });
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            error!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed {
                name: name.to_string(),
                source: e,
            });
        }

        info!("Stored file {} ({} bytes)", name, content.len());

        Ok(StoreAck {
            name: name.to_string(),
            bytes_written: content.len() as u64,
        })
    }

    /// Reads the full content stored under `name`.
    pub async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_file_name(name)?;

        match fs::read(self.root.join(name)).await {
            Ok(content) => {
                info!("Read file {} ({} bytes)", name, content.len());
                Ok(content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed {
                name: name.to_string(),
                source: e,
            }),
        }
    }

    /// Lists the regular files directly under the root, in enumeration order.
    ///
    /// Entries whose metadata cannot be read, or whose names are not UTF-8,
    /// are skipped with a warning. Only an unreadable root fails the call.
    pub async fn list(&self) -> Result<Vec<StoredFileInfo>, StorageError> {
        let mut entries =
            fs::read_dir(&self.root)
                .await
                .map_err(|e| StorageError::RootUnreadable {
                    root: self.root.clone(),
                    source: e,
                })?;

        let mut files = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Stopped enumerating {} after {} entries: {}",
                        self.root.display(),
                        files.len(),
                        e
                    );
                    break;
                }
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping entry with non UTF-8 name {:?}", raw);
                    continue;
                }
            };

            // Follows symlinks, so a link to a directory is skipped too.
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", name, e);
                    continue;
                }
            };

            if metadata.is_dir() {
                continue;
            }

            match metadata.modified() {
                Ok(modified) => files.push(StoredFileInfo { name, modified }),
                Err(e) => warn!("Skipping entry {} without modification time: {}", name, e),
            }
        }

        info!("Listed {} - {} files", self.root.display(), files.len());
        Ok(files)
    }

    /// Creates a fresh staging file, creating the staging directory (but
    /// never the root) on first use. Names another writer already holds are
    /// skipped, never truncated.
    async fn create_staging(&self) -> std::io::Result<(PathBuf, fs::File)> {
        let staging_dir = self.root.join(STAGING_DIR);

        match fs::create_dir(&staging_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }

        loop {
            let seq = self.staging_seq.fetch_add(1, Ordering::Relaxed);
            let path = staging_dir.join(format!("{}-{}.tmp", std::process::id(), seq));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Staging file {} is taken", path.display());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn write_synced(mut file: fs::File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}
