use async_trait::async_trait;

use crate::domain::JobDescriptor;

/// Producer side of the durable job queue.
///
/// `Ok` means the broker accepted a persistent message. It says nothing about
/// consumption.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    async fn publish(&self, descriptor: &JobDescriptor) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),
    #[error("message encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
