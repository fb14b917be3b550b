use crate::domain::AudioId;

/// Failures of the job record store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database unreachable: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("job record {0} not found")]
    NotFound(AudioId),
    #[error("record rejected: {0}")]
    ConstraintViolation(String),
}
