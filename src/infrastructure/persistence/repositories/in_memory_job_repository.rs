use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{AudioId, AudioJob, JobFieldsUpdate, JobStatus};

/// Process-local job store for single-node runs and tests.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<AudioId, AudioJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &AudioJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate audio id {}",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn find(&self, id: AudioId) -> Result<Option<AudioJob>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn update_fields(
        &self,
        id: AudioId,
        fields: &JobFieldsUpdate,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        fields.apply_to(job);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_status(
        &self,
        id: AudioId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        job.status = status;
        job.error_message = error_message.map(str::to_string);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn record_failure(
        &self,
        id: AudioId,
        error_message: &str,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        job.fail(error_message);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AudioJob>, RepositoryError> {
        let mut owned: Vec<AudioJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete(&self, id: AudioId) -> Result<(), RepositoryError> {
        self.jobs.write().await.remove(&id);
        Ok(())
    }
}
