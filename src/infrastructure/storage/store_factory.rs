use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_audio_store::{ObjectAudioStore, S3Location};

pub struct AudioStoreFactory;

impl AudioStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn AudioStore>, AudioStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                Ok(Arc::new(ObjectAudioStore::local(path)?))
            }
            StorageProviderSetting::S3 => {
                let required = |value: &Option<String>, key: &str| {
                    value
                        .clone()
                        .ok_or_else(|| AudioStoreError::UploadFailed(format!("{} required", key)))
                };
                let location = S3Location {
                    endpoint: required(&settings.s3_endpoint, "s3_endpoint")?,
                    bucket: settings.bucket.clone(),
                    region: settings.s3_region.clone(),
                    access_key: required(&settings.s3_access_key, "s3_access_key")?,
                    secret_key: required(&settings.s3_secret_key, "s3_secret_key")?,
                    allow_http: !settings.s3_secure,
                };
                Ok(Arc::new(ObjectAudioStore::s3(&location)?))
            }
        }
    }
}
