use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::io::AsyncWriteExt;

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::domain::ObjectName;

/// Connection details for an S3-compatible bucket such as MinIO.
#[derive(Debug, Clone)]
pub struct S3Location {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub allow_http: bool,
}

/// `AudioStore` over any `object_store` backend.
pub struct ObjectAudioStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectAudioStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    pub fn local(base_path: PathBuf) -> Result<Self, AudioStoreError> {
        std::fs::create_dir_all(&base_path).map_err(AudioStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;
        Ok(Self::new(Arc::new(fs)))
    }

    /// The bucket must already exist.
    pub fn s3(location: &S3Location) -> Result<Self, AudioStoreError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(&location.endpoint)
            .with_bucket_name(&location.bucket)
            .with_region(&location.region)
            .with_access_key_id(&location.access_key)
            .with_secret_access_key(&location.secret_key)
            .with_allow_http(location.allow_http)
            .build()
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;
        Ok(Self::new(Arc::new(store)))
    }
}

fn map_read_error(e: object_store::Error) -> AudioStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => AudioStoreError::NotFound(path),
        other => AudioStoreError::DownloadFailed(other.to_string()),
    }
}

#[async_trait::async_trait]
impl AudioStore for ObjectAudioStore {
    async fn put(&self, name: &ObjectName, data: Bytes) -> Result<ObjectName, AudioStoreError> {
        let store_path = StorePath::from(name.as_str());
        let size = data.len();
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;

        tracing::info!(object_name = %name, bytes = size, "Audio stored");
        Ok(name.clone())
    }

    async fn download_to(
        &self,
        name: &ObjectName,
        local_path: &Path,
    ) -> Result<(), AudioStoreError> {
        let store_path = StorePath::from(name.as_str());
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(map_read_error)?;

        let mut file = tokio::fs::File::create(local_path).await?;
        let mut stream = result.into_stream();
        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_read_error)?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(object_name = %name, bytes = total_bytes, "Audio downloaded");
        Ok(())
    }

    async fn delete(&self, name: &ObjectName) -> Result<(), AudioStoreError> {
        let store_path = StorePath::from(name.as_str());
        self.inner.delete(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { path, .. } => AudioStoreError::NotFound(path),
            other => AudioStoreError::DeleteFailed(other.to_string()),
        })
    }
}
