use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{AudioJob, OutputFormat};

/// Which secondary output a job asked for, read from its record at processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessPlan {
    pub format: Option<OutputFormat>,
}

impl PostProcessPlan {
    /// Second phase of the two-phase read: the descriptor decides what to
    /// transcribe, the stored record decides what to do with the text.
    pub fn from_record(job: &AudioJob) -> Self {
        let format = if job.generate_llm_output {
            OutputFormat::parse(&job.output_format)
        } else {
            None
        };
        Self { format }
    }

    pub fn raw() -> Self {
        Self { format: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedOutput {
    pub text: String,
    pub llm_model_used: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    #[error("empty transcription")]
    EmptyTranscription,
    #[error("{0}")]
    Llm(#[from] LlmClientError),
}

impl PostProcessError {
    pub fn annotation(&self) -> String {
        format!("[LLM output unavailable: {}]", self)
    }
}

/// Produces `output_text` from a transcription. Never fails: a text-generation
/// error is embedded in the returned text instead.
pub struct OutputFormatter {
    llm_client: Arc<dyn LlmClient>,
}

impl OutputFormatter {
    pub fn new(llm_client: Arc<dyn LlmClient>) -> Self {
        Self { llm_client }
    }

    pub async fn render(
        &self,
        transcription: &str,
        plan: PostProcessPlan,
        language: &str,
    ) -> FormattedOutput {
        let Some(format) = plan.format else {
            return FormattedOutput {
                text: transcription.trim().to_string(),
                llm_model_used: None,
            };
        };

        let text = match self.generate(transcription, format, language).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, format = %format, "Post-processing degraded");
                e.annotation()
            }
        };

        FormattedOutput {
            text,
            llm_model_used: Some(format.as_str().to_string()),
        }
    }

    async fn generate(
        &self,
        transcription: &str,
        format: OutputFormat,
        language: &str,
    ) -> Result<String, PostProcessError> {
        if transcription.trim().is_empty() {
            return Err(PostProcessError::EmptyTranscription);
        }
        let text = self
            .llm_client
            .generate(transcription, format, language)
            .await?;
        Ok(text.trim().to_string())
    }
}
