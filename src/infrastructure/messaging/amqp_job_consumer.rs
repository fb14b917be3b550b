use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use lapin::options::{BasicCancelOptions, BasicConsumeOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::Connection;
use tokio::task::JoinSet;

use crate::application::services::DeliveryHandler;

use super::amqp_acknowledger::AmqpAcknowledger;
use super::amqp_connection::QueueTopology;

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    #[error("failed to open channel: {0}")]
    Channel(#[source] lapin::Error),
    #[error("failed to set up queue: {0}")]
    Setup(#[source] lapin::Error),
    #[error("consumer stream failed: {0}")]
    Stream(#[source] lapin::Error),
    #[error("consumer stream closed by broker")]
    StreamClosed,
}

/// Pulls deliveries from the job queue and hands each one to the
/// [`DeliveryHandler`] on its own task.
///
/// The broker never has more than `prefetch` unsettled deliveries outstanding
/// for this consumer, which bounds the number of concurrent tasks.
pub struct AmqpJobConsumer {
    connection: Connection,
    topology: QueueTopology,
    prefetch: u16,
    consumer_tag: String,
    handler: Arc<DeliveryHandler>,
}

impl AmqpJobConsumer {
    pub fn new(
        connection: Connection,
        topology: QueueTopology,
        prefetch: u16,
        consumer_tag: impl Into<String>,
        handler: Arc<DeliveryHandler>,
    ) -> Self {
        Self {
            connection,
            topology,
            prefetch,
            consumer_tag: consumer_tag.into(),
            handler,
        }
    }

    /// Consumes until `shutdown` resolves or the broker closes the stream.
    /// In-flight deliveries are drained before returning.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ConsumeError>
    where
        F: Future<Output = ()> + Send,
    {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(ConsumeError::Channel)?;
        channel
            .basic_qos(self.prefetch, BasicQosOptions::default())
            .await
            .map_err(ConsumeError::Setup)?;
        self.topology
            .declare(&channel)
            .await
            .map_err(ConsumeError::Setup)?;

        let mut consumer = channel
            .basic_consume(
                &self.topology.queue,
                &self.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(ConsumeError::Setup)?;

        tracing::info!(
            queue = %self.topology.queue,
            prefetch = self.prefetch,
            consumer_tag = %self.consumer_tag,
            "Consuming transcription jobs"
        );

        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, cancelling consumer");
                    if let Err(e) = channel
                        .basic_cancel(&self.consumer_tag, BasicCancelOptions::default())
                        .await
                    {
                        tracing::warn!(error = %e, "Failed to cancel consumer");
                    }
                    break Ok(());
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_task_result(joined);
                }
                next = consumer.next() => match next {
                    Some(Ok(delivery)) => {
                        let handler = Arc::clone(&self.handler);
                        in_flight.spawn(async move {
                            let acknowledger = AmqpAcknowledger::new(delivery.acker);
                            if let Err(e) = handler.handle(&delivery.data, &acknowledger).await {
                                tracing::error!(error = %e, "Delivery could not be settled");
                            }
                        });
                    }
                    Some(Err(e)) => break Err(ConsumeError::Stream(e)),
                    None => break Err(ConsumeError::StreamClosed),
                },
            }
        };

        if !in_flight.is_empty() {
            tracing::info!(in_flight = in_flight.len(), "Waiting for in-flight jobs");
        }
        while let Some(joined) = in_flight.join_next().await {
            log_task_result(joined);
        }

        if let Err(e) = channel.close(200, "worker shutdown").await {
            tracing::debug!(error = %e, "Channel close failed");
        }

        result
    }
}

fn log_task_result(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Delivery task panicked");
    }
}
