use serde::{Deserialize, Serialize};

use super::{AudioId, ObjectName, OutputFormat, TranscriptionMode};

/// Queue message describing one transcription task.
///
/// Only `audio_id` and `object_name` are required on the wire; a missing
/// `mode` means `accurate` and a missing `output_format` means `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub audio_id: AudioId,
    pub object_name: ObjectName,
    #[serde(default = "default_mode")]
    pub mode: TranscriptionMode,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl JobDescriptor {
    pub fn new(
        audio_id: AudioId,
        object_name: ObjectName,
        mode: TranscriptionMode,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            audio_id,
            object_name,
            mode,
            output_format: output_format.into(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

fn default_mode() -> TranscriptionMode {
    TranscriptionMode::Accurate
}

fn default_output_format() -> String {
    OutputFormat::Text.as_str().to_string()
}
