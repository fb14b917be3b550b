use std::time::Duration;

use lapin::options::QueueDeclareOptions;
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::{info, instrument, warn};

/// Durable queue declaration shared by producer and consumer so both sides
/// agree on the queue arguments.
#[derive(Debug, Clone)]
pub struct QueueTopology {
    pub queue: String,
    pub dead_letter_exchange: Option<String>,
}

impl QueueTopology {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            dead_letter_exchange: None,
        }
    }

    pub fn with_dead_letter_exchange(mut self, exchange: Option<String>) -> Self {
        self.dead_letter_exchange = exchange.filter(|e| !e.is_empty());
        self
    }

    pub fn arguments(&self) -> FieldTable {
        let mut args = FieldTable::default();
        if let Some(exchange) = &self.dead_letter_exchange {
            args.insert(
                "x-dead-letter-exchange".into(),
                AMQPValue::LongString(exchange.as_str().into()),
            );
        }
        args
    }

    pub async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                self.arguments(),
            )
            .await?;
        Ok(())
    }
}

#[instrument(skip(uri))]
pub async fn connect_with_retry(uri: &str, mut retries: u32) -> Result<Connection, lapin::Error> {
    let mut delay = Duration::from_millis(500);

    loop {
        match Connection::connect(uri, ConnectionProperties::default()).await {
            Ok(connection) => {
                info!("AMQP connection established");
                return Ok(connection);
            }
            Err(e) if retries > 0 => {
                retries -= 1;
                warn!(
                    error = %e,
                    retries_left = retries,
                    delay_ms = delay.as_millis(),
                    "AMQP connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
