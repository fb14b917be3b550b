use std::sync::Arc;

use crate::application::ports::{AudioStore, AudioStoreError, JobRepository, RepositoryError};
use crate::domain::{AudioId, AudioJob, JobFieldsUpdate, OutputFormat};

use super::output_formatter::{FormattedOutput, OutputFormatter, PostProcessPlan};

/// Owner-scoped operations on existing jobs: polling, re-rendering the
/// output in another format, listing and deletion.
pub struct JobManagementService {
    job_repository: Arc<dyn JobRepository>,
    audio_store: Arc<dyn AudioStore>,
    formatter: OutputFormatter,
}

impl JobManagementService {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        audio_store: Arc<dyn AudioStore>,
        formatter: OutputFormatter,
    ) -> Self {
        Self {
            job_repository,
            audio_store,
            formatter,
        }
    }

    pub async fn result(&self, id: AudioId, owner_id: &str) -> Result<AudioJob, ManagementError> {
        self.owned_job(id, owner_id).await
    }

    /// Regenerates `output_text` from the stored transcription in `format`.
    #[tracing::instrument(skip(self, owner_id), fields(audio_id = %id))]
    pub async fn reinterpret(
        &self,
        id: AudioId,
        owner_id: &str,
        format: &str,
    ) -> Result<FormattedOutput, ManagementError> {
        let output_format = OutputFormat::parse(format)
            .ok_or_else(|| ManagementError::InvalidOutputFormat(format.to_string()))?;
        let job = self.owned_job(id, owner_id).await?;

        let transcription = job
            .transcription
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ManagementError::NoTranscription(id))?;

        let plan = PostProcessPlan {
            format: Some(output_format),
        };
        let output = self.formatter.render(transcription, plan, &job.language).await;

        let fields = JobFieldsUpdate {
            output_text: Some(output.text.clone()),
            output_format: Some(output_format.as_str().to_string()),
            llm_model_used: Some(output.llm_model_used.clone()),
            ..Default::default()
        };
        self.job_repository.update_fields(id, &fields).await?;

        tracing::info!(format = %output_format, "Output reinterpreted");
        Ok(output)
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<AudioJob>, ManagementError> {
        Ok(self.job_repository.list_by_owner(owner_id).await?)
    }

    /// Removes the stored audio, then the record.
    #[tracing::instrument(skip(self, owner_id), fields(audio_id = %id))]
    pub async fn delete(&self, id: AudioId, owner_id: &str) -> Result<(), ManagementError> {
        let job = self.owned_job(id, owner_id).await?;

        match self.audio_store.delete(&job.object_name).await {
            Ok(()) | Err(AudioStoreError::NotFound(_)) => {}
            Err(e) => return Err(ManagementError::Storage(e)),
        }
        self.job_repository.delete(id).await?;

        tracing::info!("Audio deleted");
        Ok(())
    }

    async fn owned_job(&self, id: AudioId, owner_id: &str) -> Result<AudioJob, ManagementError> {
        let job = self
            .job_repository
            .find(id)
            .await?
            .ok_or(ManagementError::NotFound(id))?;
        if job.owner_id != owner_id {
            return Err(ManagementError::Forbidden(id));
        }
        Ok(job)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManagementError {
    #[error("audio {0} not found")]
    NotFound(AudioId),
    #[error("access to audio {0} denied")]
    Forbidden(AudioId),
    #[error("audio {0} has no transcription yet")]
    NoTranscription(AudioId),
    #[error("invalid output format: {0}")]
    InvalidOutputFormat(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(AudioStoreError),
}
