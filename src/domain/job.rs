use chrono::{DateTime, Utc};

use super::{AudioId, JobStatus, ObjectName};

/// Language recorded before detection has run.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Who uploaded what; captured once at submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadMetadata {
    pub owner_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Persisted status and result document for one audio upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioJob {
    pub id: AudioId,
    pub owner_id: String,
    pub filename: String,
    pub content_type: String,
    pub object_name: ObjectName,
    pub size_bytes: u64,
    pub status: JobStatus,
    pub output_format: String,
    pub generate_llm_output: bool,
    pub transcription: Option<String>,
    pub output_text: Option<String>,
    pub language: String,
    pub model_used: Option<String>,
    pub llm_model_used: Option<String>,
    pub duration: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AudioJob {
    pub fn new(
        id: AudioId,
        object_name: ObjectName,
        upload: UploadMetadata,
        output_format: impl Into<String>,
        generate_llm_output: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: upload.owner_id,
            filename: upload.filename,
            content_type: upload.content_type,
            object_name,
            size_bytes: upload.size_bytes,
            status: JobStatus::Processing,
            output_format: output_format.into(),
            generate_llm_output,
            transcription: None,
            output_text: None,
            language: UNKNOWN_LANGUAGE.to_string(),
            model_used: None,
            llm_model_used: None,
            duration: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record failed and drops every result a previous attempt left.
    pub fn fail(&mut self, error_message: &str) {
        self.status = JobStatus::Failed;
        self.error_message = Some(error_message.to_string());
        self.transcription = None;
        self.output_text = None;
        self.language = UNKNOWN_LANGUAGE.to_string();
        self.model_used = None;
        self.llm_model_used = None;
        self.duration = None;
    }

    /// A completed record carries a transcription; a failed one carries an error message.
    pub fn satisfies_status_invariant(&self) -> bool {
        match self.status {
            JobStatus::Processing => true,
            JobStatus::Completed => self.transcription.is_some(),
            JobStatus::Failed => self.error_message.is_some(),
        }
    }
}
