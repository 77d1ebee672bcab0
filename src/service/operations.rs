//! Service operations
//!
//! Every call first acquires a slot from its traffic class budget, then runs
//! the store operation in a task that owns the permit. The slot is therefore
//! held until the filesystem work has finished, even if the caller stops
//! waiting, and is released exactly once when that task ends.

use log::info;
use std::future::Future;
use std::sync::Arc;

use crate::admission::{AdmissionController, AdmissionPermit, TrafficClass};
use crate::config::{LimitsConfig, StartupConfig};
use crate::error::handlers::handle_error;
use crate::error::{FileServiceError, StorageError};
use crate::service::results::{
    DownloadResponse, FileMetadata, ListFilesResponse, UPLOAD_SUCCESS_MESSAGE, UploadResponse,
};
use crate::storage::{FileStore, StoreAck, StoredFileInfo};

/// The admission-controlled file access layer. Cheap to clone; all clones
/// share the same budgets and store.
#[derive(Clone)]
pub struct FileService {
    admission: Arc<AdmissionController>,
    store: Arc<FileStore>,
}

impl FileService {
    pub fn new(admission: AdmissionController, store: FileStore) -> Self {
        Self {
            admission: Arc::new(admission),
            store: Arc::new(store),
        }
    }

    pub fn from_config(startup: &StartupConfig, limits: &LimitsConfig) -> Self {
        Self::new(
            AdmissionController::from_limits(limits),
            FileStore::new(startup.storage_root_path()),
        )
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Stores `content` under `filename`, replacing any previous file.
    ///
    /// `cancel` bounds the wait for a transfer slot; when it completes first
    /// the call fails with `Overloaded` and storage is not touched.
    pub async fn upload<C>(
        &self,
        filename: &str,
        content: Vec<u8>,
        cancel: C,
    ) -> Result<UploadResponse, FileServiceError>
    where
        C: Future,
    {
        let result: Result<StoreAck, FileServiceError> = async {
            let permit = self.admission.acquire(TrafficClass::Transfer, cancel).await?;
            let store = Arc::clone(&self.store);
            let name = filename.to_string();
            run_admitted(permit, async move { store.put(&name, &content).await }).await
        }
        .await;

        match result {
            Ok(ack) => {
                info!("uploaded file: {} ({} bytes)", ack.name, ack.bytes_written);
                Ok(UploadResponse {
                    message: UPLOAD_SUCCESS_MESSAGE.to_string(),
                })
            }
            Err(e) => {
                handle_error("upload", filename, &e);
                Err(e)
            }
        }
    }

    /// Lists every stored file. Order is unspecified.
    pub async fn list_files<C>(&self, cancel: C) -> Result<ListFilesResponse, FileServiceError>
    where
        C: Future,
    {
        let result: Result<Vec<StoredFileInfo>, FileServiceError> = async {
            let permit = self.admission.acquire(TrafficClass::Listing, cancel).await?;
            let store = Arc::clone(&self.store);
            run_admitted(permit, async move { store.list().await }).await
        }
        .await;

        match result {
            Ok(entries) => Ok(ListFilesResponse {
                files: entries.into_iter().map(FileMetadata::from).collect(),
            }),
            Err(e) => {
                handle_error("list", &self.store.root().display().to_string(), &e);
                Err(e)
            }
        }
    }

    /// Returns the full content stored under `filename`.
    pub async fn download<C>(
        &self,
        filename: &str,
        cancel: C,
    ) -> Result<DownloadResponse, FileServiceError>
    where
        C: Future,
    {
        let result: Result<Vec<u8>, FileServiceError> = async {
            let permit = self.admission.acquire(TrafficClass::Transfer, cancel).await?;
            let store = Arc::clone(&self.store);
            let name = filename.to_string();
            run_admitted(permit, async move { store.get(&name).await }).await
        }
        .await;

        match result {
            Ok(content) => {
                info!("downloaded file: {} ({} bytes)", filename, content.len());
                Ok(DownloadResponse { content })
            }
            Err(e) => {
                handle_error("download", filename, &e);
                Err(e)
            }
        }
    }
}

/// Runs admitted store work on its own task, which drops the permit when the
/// work completes.
async fn run_admitted<T, F>(permit: AdmissionPermit, work: F) -> Result<T, FileServiceError>
where
    F: Future<Output = Result<T, StorageError>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(async move {
        let _permit = permit;
        work.await
    });

    match handle.await {
        Ok(result) => result.map_err(FileServiceError::from),
        Err(e) => Err(FileServiceError::TaskFailed(e.to_string())),
    }
}
