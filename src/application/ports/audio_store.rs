use std::io;
use std::path::Path;

use bytes::Bytes;

use crate::domain::ObjectName;

/// Byte storage for uploaded audio, addressed by object name.
#[async_trait::async_trait]
pub trait AudioStore: Send + Sync {
    async fn put(&self, name: &ObjectName, data: Bytes) -> Result<ObjectName, AudioStoreError>;

    /// Copies the object into `local_path`, truncating any existing content.
    async fn download_to(
        &self,
        name: &ObjectName,
        local_path: &Path,
    ) -> Result<(), AudioStoreError>;

    async fn delete(&self, name: &ObjectName) -> Result<(), AudioStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
