use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ModelTier;

/// A loaded speech-to-text model.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;

    /// Returns an ISO 639-1 code such as `en`.
    async fn detect_language(&self, audio_path: &Path) -> Result<String, TranscriptionError>;
}

/// Builds an engine for a tier. Called only on a cache miss.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(
        &self,
        tier: ModelTier,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("language detection failed: {0}")]
    LanguageDetectionFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
