use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::{BasicProperties, Channel, Connection};
use tokio::sync::Mutex;

use crate::application::ports::{JobPublisher, PublishError};
use crate::domain::JobDescriptor;

use super::amqp_connection::{QueueTopology, connect_with_retry};

const PERSISTENT_DELIVERY_MODE: u8 = 2;

struct PublisherLink {
    connection: Connection,
    channel: Channel,
}

impl PublisherLink {
    fn is_open(&self) -> bool {
        self.connection.status().connected() && self.channel.status().connected()
    }
}

/// Publishes job descriptors as persistent messages on the default exchange.
///
/// The connection is opened lazily and re-established after any failure, so
/// a broker outage surfaces as `BrokerUnavailable` on the affected call only.
pub struct AmqpJobPublisher {
    uri: String,
    topology: QueueTopology,
    connect_retries: u32,
    link: Mutex<Option<PublisherLink>>,
}

impl AmqpJobPublisher {
    pub fn new(uri: impl Into<String>, topology: QueueTopology, connect_retries: u32) -> Self {
        Self {
            uri: uri.into(),
            topology,
            connect_retries,
            link: Mutex::new(None),
        }
    }

    async fn open_link(&self) -> Result<PublisherLink, lapin::Error> {
        let connection = connect_with_retry(&self.uri, self.connect_retries).await?;
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        self.topology.declare(&channel).await?;
        Ok(PublisherLink {
            connection,
            channel,
        })
    }

    async fn publish_on(channel: &Channel, queue: &str, payload: &[u8]) -> Result<(), String> {
        let properties = BasicProperties::default()
            .with_delivery_mode(PERSISTENT_DELIVERY_MODE)
            .with_content_type("application/json".into());

        let confirmation = channel
            .basic_publish("", queue, BasicPublishOptions::default(), payload, properties)
            .await
            .map_err(|e| e.to_string())?
            .await
            .map_err(|e| e.to_string())?;

        match confirmation {
            Confirmation::Nack(_) => Err("broker rejected the message".to_string()),
            Confirmation::Ack(_) | Confirmation::NotRequested => Ok(()),
        }
    }
}

#[async_trait]
impl JobPublisher for AmqpJobPublisher {
    async fn publish(&self, descriptor: &JobDescriptor) -> Result<(), PublishError> {
        let payload = descriptor.to_json()?;

        let mut link = self.link.lock().await;
        if !link.as_ref().is_some_and(PublisherLink::is_open) {
            let opened = self
                .open_link()
                .await
                .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;
            *link = Some(opened);
        }

        let Some(open) = link.as_ref() else {
            return Err(PublishError::BrokerUnavailable(
                "no broker connection".to_string(),
            ));
        };

        match Self::publish_on(&open.channel, &self.topology.queue, &payload).await {
            Ok(()) => {
                tracing::info!(
                    audio_id = %descriptor.audio_id,
                    queue = %self.topology.queue,
                    "Job published"
                );
                Ok(())
            }
            Err(reason) => {
                *link = None;
                tracing::error!(
                    audio_id = %descriptor.audio_id,
                    error = %reason,
                    "Job publish failed"
                );
                Err(PublishError::BrokerUnavailable(reason))
            }
        }
    }
}
