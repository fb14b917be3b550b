use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;

use crate::application::ports::{
    AudioProbe, AudioStore, AudioStoreError, JobRepository, RepositoryError, TranscriptionError,
};
use crate::domain::{
    AudioId, JobDescriptor, JobFieldsUpdate, JobStatus, ModelTier, ObjectName, UNKNOWN_LANGUAGE,
};

use super::model_cache::ModelCache;
use super::output_formatter::{OutputFormatter, PostProcessPlan};

/// Terminal business result of one pipeline run. Both variants are recorded
/// on the job record before `process` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed {
        model_used: ModelTier,
        language: String,
        duration_secs: f64,
        llm_model_used: Option<String>,
    },
    Failed {
        error_message: String,
    },
}

impl PipelineError {
    /// Whether a later attempt could record an outcome. A deleted record
    /// never comes back.
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::StatusNotRecorded { .. })
    }
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Completed { .. } => JobStatus::Completed,
            JobOutcome::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// Fatal step failures. Their display text becomes the record's `error_message`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineFailure {
    #[error("failed to fetch audio '{object_name}': {source}")]
    Fetch {
        object_name: ObjectName,
        #[source]
        source: AudioStoreError,
    },
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("job record lookup failed: {0}")]
    RecordLookup(RepositoryError),
    #[error("job record {0} not found")]
    RecordMissing(AudioId),
    #[error("failed to persist transcription: {0}")]
    Persist(RepositoryError),
}

/// The failure could not be written to the job record, so nothing terminal
/// was recorded for this attempt.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("job {audio_id} failed ({failure}) and its record no longer exists")]
    RecordDeleted { audio_id: AudioId, failure: String },
    #[error("job {audio_id} failed ({failure}) and the failure could not be recorded: {source}")]
    StatusNotRecorded {
        audio_id: AudioId,
        failure: String,
        #[source]
        source: RepositoryError,
    },
}

pub struct TranscriptionPipeline {
    audio_store: Arc<dyn AudioStore>,
    job_repository: Arc<dyn JobRepository>,
    models: Arc<ModelCache>,
    probe: Arc<dyn AudioProbe>,
    formatter: OutputFormatter,
    scratch_dir: PathBuf,
}

struct Transcript {
    text: String,
    language: String,
    tier: ModelTier,
    duration_secs: f64,
}

impl TranscriptionPipeline {
    pub fn new(
        audio_store: Arc<dyn AudioStore>,
        job_repository: Arc<dyn JobRepository>,
        models: Arc<ModelCache>,
        probe: Arc<dyn AudioProbe>,
        formatter: OutputFormatter,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            audio_store,
            job_repository,
            models,
            probe,
            formatter,
            scratch_dir,
        }
    }

    /// Runs one job to a terminal status.
    ///
    /// Returns `Err` only when a fatal failure could not be written to the
    /// job record either. A failure write resets the fields a previous
    /// attempt may have completed.
    pub async fn process(&self, descriptor: &JobDescriptor) -> Result<JobOutcome, PipelineError> {
        let audio_id = descriptor.audio_id;

        match self.run(descriptor).await {
            Ok(outcome) => {
                tracing::info!(status = %outcome.status(), "Transcription job completed");
                Ok(outcome)
            }
            Err(failure) => {
                let error_message = failure.to_string();
                tracing::error!(error = %error_message, "Transcription job failed");
                tracing::debug!(status = %JobStatus::Failed, "Job status transition");
                match self
                    .job_repository
                    .record_failure(audio_id, &error_message)
                    .await
                {
                    Ok(()) => Ok(JobOutcome::Failed { error_message }),
                    Err(RepositoryError::NotFound(_)) => Err(PipelineError::RecordDeleted {
                        audio_id,
                        failure: error_message,
                    }),
                    Err(source) => Err(PipelineError::StatusNotRecorded {
                        audio_id,
                        failure: error_message,
                        source,
                    }),
                }
            }
        }
    }

    async fn run(&self, descriptor: &JobDescriptor) -> Result<JobOutcome, PipelineFailure> {
        let local_audio = self.fetch(&descriptor.object_name).await?;

        let result = self.process_local(descriptor, &local_audio).await;

        if let Err(e) = local_audio.close() {
            tracing::warn!(error = %e, "Failed to remove transient audio file");
        }

        result
    }

    async fn process_local(
        &self,
        descriptor: &JobDescriptor,
        local_audio: &Path,
    ) -> Result<JobOutcome, PipelineFailure> {
        let transcript = self.transcribe(descriptor, local_audio).await?;

        let job = self
            .job_repository
            .find(descriptor.audio_id)
            .await
            .map_err(PipelineFailure::RecordLookup)?
            .ok_or(PipelineFailure::RecordMissing(descriptor.audio_id))?;
        let plan = PostProcessPlan::from_record(&job);

        let output = self
            .formatter
            .render(&transcript.text, plan, &transcript.language)
            .await;

        let fields = JobFieldsUpdate {
            transcription: Some(transcript.text),
            output_text: Some(output.text),
            output_format: None,
            language: Some(transcript.language.clone()),
            model_used: Some(transcript.tier.as_str().to_string()),
            llm_model_used: Some(output.llm_model_used.clone()),
            duration: Some(transcript.duration_secs),
        };
        self.job_repository
            .update_fields(descriptor.audio_id, &fields)
            .await
            .map_err(PipelineFailure::Persist)?;
        self.update_status(descriptor.audio_id, JobStatus::Completed, None)
            .await
            .map_err(PipelineFailure::Persist)?;

        Ok(JobOutcome::Completed {
            model_used: transcript.tier,
            language: transcript.language,
            duration_secs: transcript.duration_secs,
            llm_model_used: output.llm_model_used,
        })
    }

    /// Copies the object into a fresh file under the scratch directory. The
    /// returned path deletes the file when dropped.
    async fn fetch(&self, object_name: &ObjectName) -> Result<TempPath, PipelineFailure> {
        let fetch_error = |source: AudioStoreError| PipelineFailure::Fetch {
            object_name: object_name.clone(),
            source,
        };

        let suffix = object_name
            .extension()
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let local_audio = tempfile::Builder::new()
            .prefix("whispai-")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| fetch_error(AudioStoreError::Io(e)))?
            .into_temp_path();

        self.audio_store
            .download_to(object_name, &local_audio)
            .await
            .map_err(fetch_error)?;

        tracing::debug!(path = %local_audio.display(), "Audio fetched to transient file");
        Ok(local_audio)
    }

    async fn transcribe(
        &self,
        descriptor: &JobDescriptor,
        local_audio: &Path,
    ) -> Result<Transcript, PipelineFailure> {
        let duration_secs = match self.probe.duration_secs(local_audio).await {
            Ok(secs) => secs,
            Err(e) => {
                tracing::warn!(error = %e, "Could not probe audio duration, assuming 0s");
                0.0
            }
        };

        let tier = ModelTier::select(descriptor.mode, duration_secs);
        tracing::debug!(
            mode = %descriptor.mode,
            duration_secs,
            tier = %tier,
            "Transcription model selected"
        );

        let lease = self.models.acquire(tier).await?;
        let language = lease.engine().detect_language(local_audio).await?;
        let text = lease.engine().transcribe(local_audio).await?;
        drop(lease);

        let language = if language.trim().is_empty() {
            UNKNOWN_LANGUAGE.to_string()
        } else {
            language
        };

        Ok(Transcript {
            text,
            language,
            tier,
            duration_secs,
        })
    }

    async fn update_status(
        &self,
        audio_id: AudioId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        tracing::debug!(status = %status, "Job status transition");
        self.job_repository
            .set_status(audio_id, status, error_message)
            .await
    }
}
