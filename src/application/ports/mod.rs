mod acknowledger;
mod audio_probe;
mod audio_store;
mod job_publisher;
mod job_repository;
mod llm_client;
mod repository_error;
mod transcription_engine;

pub use acknowledger::{AckError, Acknowledger};
pub use audio_probe::{AudioProbe, AudioProbeError};
pub use audio_store::{AudioStore, AudioStoreError};
pub use job_publisher::{JobPublisher, PublishError};
pub use job_repository::JobRepository;
pub use llm_client::{LlmClient, LlmClientError};
pub use repository_error::RepositoryError;
pub use transcription_engine::{ModelLoader, TranscriptionEngine, TranscriptionError};
