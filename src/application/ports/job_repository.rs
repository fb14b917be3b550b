use crate::domain::{AudioId, AudioJob, JobFieldsUpdate, JobStatus};
use async_trait::async_trait;

use super::RepositoryError;

/// Persistence of job records, keyed by audio id.
///
/// Every write overwrites; none appends. A redelivered job can therefore be
/// processed again against a record left half-updated by a crashed attempt.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &AudioJob) -> Result<(), RepositoryError>;

    async fn find(&self, id: AudioId) -> Result<Option<AudioJob>, RepositoryError>;

    async fn update_fields(
        &self,
        id: AudioId,
        fields: &JobFieldsUpdate,
    ) -> Result<(), RepositoryError>;

    /// Sets `status` and overwrites `error_message` (clearing it on `None`).
    async fn set_status(
        &self,
        id: AudioId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Sets `failed` with `error_message` in one write and resets the result
    /// fields (transcription, output, language, models, duration).
    async fn record_failure(
        &self,
        id: AudioId,
        error_message: &str,
    ) -> Result<(), RepositoryError>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AudioJob>, RepositoryError>;

    async fn delete(&self, id: AudioId) -> Result<(), RepositoryError>;
}
