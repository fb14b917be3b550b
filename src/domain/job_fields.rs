use super::AudioJob;

/// Partial update of a job record's result fields.
///
/// `None` leaves a field untouched; `Some` overwrites it. `llm_model_used`
/// is doubly optional so a re-run can clear a previously recorded model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFieldsUpdate {
    pub transcription: Option<String>,
    pub output_text: Option<String>,
    pub output_format: Option<String>,
    pub language: Option<String>,
    pub model_used: Option<String>,
    pub llm_model_used: Option<Option<String>>,
    pub duration: Option<f64>,
}

impl JobFieldsUpdate {
    pub fn apply_to(&self, job: &mut AudioJob) {
        if let Some(v) = &self.transcription {
            job.transcription = Some(v.clone());
        }
        if let Some(v) = &self.output_text {
            job.output_text = Some(v.clone());
        }
        if let Some(v) = &self.output_format {
            job.output_format = v.clone();
        }
        if let Some(v) = &self.language {
            job.language = v.clone();
        }
        if let Some(v) = &self.model_used {
            job.model_used = Some(v.clone());
        }
        if let Some(v) = &self.llm_model_used {
            job.llm_model_used = v.clone();
        }
        if let Some(v) = self.duration {
            job.duration = Some(v);
        }
    }
}
