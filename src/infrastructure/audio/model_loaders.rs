use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ModelLoader, TranscriptionEngine, TranscriptionError};
use crate::domain::ModelTier;
use crate::presentation::config::{
    TierModels, TranscriptionProviderSetting, TranscriptionSettings,
};

use super::candle_whisper_engine::CandleWhisperEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

/// Loads Hugging Face Whisper checkpoints into memory with candle.
pub struct CandleWhisperLoader {
    models: TierModels,
}

impl CandleWhisperLoader {
    pub fn new(models: TierModels) -> Self {
        Self { models }
    }
}

#[async_trait]
impl ModelLoader for CandleWhisperLoader {
    async fn load(
        &self,
        tier: ModelTier,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let model_id = self.models.for_tier(tier).to_string();
        let engine = tokio::task::spawn_blocking(move || CandleWhisperEngine::new(&model_id))
            .await
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("load task: {}", e)))??;
        Ok(Arc::new(engine))
    }
}

/// "Loads" a tier by pointing an HTTP client at the tier's remote model name.
pub struct OpenAiWhisperLoader {
    api_key: String,
    base_url: Option<String>,
    models: TierModels,
    timeout: Duration,
}

impl OpenAiWhisperLoader {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        models: TierModels,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key,
            base_url,
            models,
            timeout,
        }
    }
}

#[async_trait]
impl ModelLoader for OpenAiWhisperLoader {
    async fn load(
        &self,
        tier: ModelTier,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let engine = OpenAiWhisperEngine::new(
            self.api_key.clone(),
            self.base_url.clone(),
            Some(self.models.for_tier(tier).to_string()),
            self.timeout,
        )?;
        Ok(Arc::new(engine))
    }
}

pub struct ModelLoaderFactory;

impl ModelLoaderFactory {
    pub fn create(
        settings: &TranscriptionSettings,
    ) -> Result<Arc<dyn ModelLoader>, TranscriptionError> {
        match settings.provider {
            TranscriptionProviderSetting::Local => {
                Ok(Arc::new(CandleWhisperLoader::new(settings.models.clone())))
            }
            TranscriptionProviderSetting::OpenAi => {
                let key = settings.api_key.clone().ok_or_else(|| {
                    TranscriptionError::ModelLoadFailed(
                        "API key required for OpenAI Whisper".to_string(),
                    )
                })?;
                Ok(Arc::new(OpenAiWhisperLoader::new(
                    key,
                    settings.base_url.clone(),
                    settings.models.clone(),
                    Duration::from_secs(settings.timeout_secs),
                )))
            }
        }
    }
}
