mod audio_id;
mod delivery_state;
mod job;
mod job_descriptor;
mod job_fields;
mod job_status;
mod model_tier;
mod object_name;
mod output_format;
mod transcription_mode;

pub use audio_id::AudioId;
pub use delivery_state::{DeliveryState, InvalidTransition};
pub use job::{AudioJob, UNKNOWN_LANGUAGE, UploadMetadata};
pub use job_descriptor::JobDescriptor;
pub use job_fields::JobFieldsUpdate;
pub use job_status::JobStatus;
pub use model_tier::{AUTO_MEDIUM_MAX_SECS, AUTO_SMALL_MAX_SECS, ModelTier};
pub use object_name::{ALLOWED_AUDIO_EXTENSIONS, ObjectName, audio_extension};
pub use output_format::OutputFormat;
pub use transcription_mode::TranscriptionMode;
