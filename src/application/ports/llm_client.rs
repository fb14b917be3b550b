use async_trait::async_trait;

use crate::domain::OutputFormat;

/// Text-generation engine used to reformat or summarize a transcription.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        text: &str,
        format: OutputFormat,
        language: &str,
    ) -> Result<String, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
