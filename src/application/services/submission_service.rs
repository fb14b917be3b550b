use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    AudioStore, AudioStoreError, JobPublisher, JobRepository, PublishError, RepositoryError,
};
use crate::domain::{
    AudioId, AudioJob, JobDescriptor, ObjectName, OutputFormat, TranscriptionMode,
    UploadMetadata, audio_extension,
};

/// One uploaded file plus the options chosen by the client.
#[derive(Debug, Clone)]
pub struct AudioSubmission {
    pub owner_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
    pub mode: Option<String>,
    pub output_format: Option<String>,
    pub generate_llm_output: bool,
}

/// Producer-side orchestration of an upload: store the bytes, create the
/// record in `processing`, then publish the descriptor. The record always
/// exists before a worker can see the message.
pub struct SubmissionService {
    audio_store: Arc<dyn AudioStore>,
    job_repository: Arc<dyn JobRepository>,
    publisher: Arc<dyn JobPublisher>,
    max_upload_bytes: u64,
}

impl SubmissionService {
    pub fn new(
        audio_store: Arc<dyn AudioStore>,
        job_repository: Arc<dyn JobRepository>,
        publisher: Arc<dyn JobPublisher>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            audio_store,
            job_repository,
            publisher,
            max_upload_bytes,
        }
    }

    #[tracing::instrument(skip(self, submission), fields(filename = %submission.filename))]
    pub async fn submit(&self, submission: AudioSubmission) -> Result<AudioId, SubmissionError> {
        if submission.data.is_empty() {
            return Err(SubmissionError::EmptyFile);
        }
        let size_bytes = submission.data.len() as u64;
        if size_bytes > self.max_upload_bytes {
            return Err(SubmissionError::TooLarge {
                size_bytes,
                max_bytes: self.max_upload_bytes,
            });
        }
        let extension = audio_extension(&submission.filename)
            .ok_or_else(|| SubmissionError::UnsupportedFileType(submission.filename.clone()))?;

        let output_format = submission
            .output_format
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(OutputFormat::Text.as_str());
        if OutputFormat::parse(output_format).is_none() {
            return Err(SubmissionError::InvalidOutputFormat(
                output_format.to_string(),
            ));
        }
        let mode = submission
            .mode
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(TranscriptionMode::from)
            .unwrap_or(TranscriptionMode::Auto);

        let audio_id = AudioId::new();
        let object_name = ObjectName::for_upload(&audio_id, &extension);

        self.audio_store
            .put(&object_name, submission.data)
            .await
            .map_err(SubmissionError::Storage)?;

        let upload = UploadMetadata {
            owner_id: submission.owner_id,
            filename: submission.filename,
            content_type: submission.content_type,
            size_bytes,
        };
        let job = AudioJob::new(
            audio_id,
            object_name.clone(),
            upload,
            output_format,
            submission.generate_llm_output,
        );
        self.job_repository
            .create(&job)
            .await
            .map_err(SubmissionError::Repository)?;

        let descriptor = JobDescriptor::new(audio_id, object_name, mode, output_format);
        self.publisher.publish(&descriptor).await.map_err(|e| {
            tracing::error!(error = %e, audio_id = %audio_id, "Job record left in processing");
            match e {
                PublishError::BrokerUnavailable(reason) => {
                    SubmissionError::BrokerUnavailable(reason)
                }
                other => SubmissionError::Publish(other),
            }
        })?;

        tracing::info!(audio_id = %audio_id, mode = %mode, "Audio submitted for transcription");
        Ok(audio_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("empty file")]
    EmptyFile,
    #[error("file of {size_bytes} bytes exceeds the {max_bytes} byte limit")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("invalid output format: {0}")]
    InvalidOutputFormat(String),
    #[error("storage: {0}")]
    Storage(AudioStoreError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),
    #[error("publish: {0}")]
    Publish(PublishError),
}
