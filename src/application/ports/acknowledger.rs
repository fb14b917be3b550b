use async_trait::async_trait;

/// Settles one broker delivery. Exactly one of the two calls is made per delivery.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn ack(&self) -> Result<(), AckError>;

    async fn nack(&self, requeue: bool) -> Result<(), AckError>;
}

#[derive(Debug, thiserror::Error)]
#[error("failed to settle delivery: {0}")]
pub struct AckError(pub String);
