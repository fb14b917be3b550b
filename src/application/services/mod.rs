mod delivery_handler;
mod job_management_service;
mod model_cache;
mod output_formatter;
mod submission_service;
mod transcription_pipeline;

pub use delivery_handler::{DeliveryError, DeliveryHandler, Settlement};
pub use job_management_service::{JobManagementService, ManagementError};
pub use model_cache::{ModelCache, ModelLease};
pub use output_formatter::{FormattedOutput, OutputFormatter, PostProcessError, PostProcessPlan};
pub use submission_service::{AudioSubmission, SubmissionError, SubmissionService};
pub use transcription_pipeline::{JobOutcome, PipelineError, PipelineFailure, TranscriptionPipeline};
