use whispai::application::ports::{AudioStoreError, ModelLoader, TranscriptionError};
use whispai::domain::ModelTier;
use whispai::infrastructure::audio::ModelLoaderFactory;
use whispai::infrastructure::storage::AudioStoreFactory;
use whispai::presentation::config::{
    StorageProviderSetting, StorageSettings, TierModels, TranscriptionProviderSetting,
    TranscriptionSettings,
};

fn storage_settings(provider: StorageProviderSetting, local_path: String) -> StorageSettings {
    StorageSettings {
        provider,
        local_path,
        bucket: "audios".to_string(),
        s3_endpoint: None,
        s3_region: "us-east-1".to_string(),
        s3_access_key: None,
        s3_secret_key: None,
        s3_secure: false,
    }
}

fn transcription_settings(
    provider: TranscriptionProviderSetting,
    api_key: Option<String>,
) -> TranscriptionSettings {
    TranscriptionSettings {
        provider,
        models: TierModels::default(),
        api_key,
        base_url: None,
        timeout_secs: 30,
        default_tier: ModelTier::Base,
    }
}

#[test]
fn given_local_provider_when_creating_store_then_directory_is_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join("bucket");

    let store = AudioStoreFactory::create(&storage_settings(
        StorageProviderSetting::Local,
        root.to_string_lossy().into_owned(),
    ));

    assert!(store.is_ok());
    assert!(root.is_dir());
}

#[test]
fn given_s3_provider_without_endpoint_when_creating_store_then_fails() {
    let result = AudioStoreFactory::create(&storage_settings(
        StorageProviderSetting::S3,
        String::new(),
    ));

    assert!(matches!(result, Err(AudioStoreError::UploadFailed(_))));
}

#[test]
fn given_remote_provider_without_api_key_when_creating_loader_then_fails() {
    let result =
        ModelLoaderFactory::create(&transcription_settings(TranscriptionProviderSetting::OpenAi, None));

    assert!(matches!(result, Err(TranscriptionError::ModelLoadFailed(_))));
}

#[tokio::test]
async fn given_remote_provider_with_api_key_when_loading_tier_then_engine_is_built() {
    let loader = ModelLoaderFactory::create(&transcription_settings(
        TranscriptionProviderSetting::OpenAi,
        Some("key".to_string()),
    ))
    .unwrap();

    assert!(loader.load(ModelTier::Small).await.is_ok());
}
