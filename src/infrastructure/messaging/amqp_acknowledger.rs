use async_trait::async_trait;
use lapin::acker::Acker;
use lapin::options::{BasicAckOptions, BasicNackOptions};

use crate::application::ports::{AckError, Acknowledger};

pub struct AmqpAcknowledger {
    acker: Acker,
}

impl AmqpAcknowledger {
    pub fn new(acker: Acker) -> Self {
        Self { acker }
    }
}

#[async_trait]
impl Acknowledger for AmqpAcknowledger {
    async fn ack(&self) -> Result<(), AckError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| AckError(e.to_string()))
    }

    async fn nack(&self, requeue: bool) -> Result<(), AckError> {
        self.acker
            .nack(BasicNackOptions {
                requeue,
                ..Default::default()
            })
            .await
            .map_err(|e| AckError(e.to_string()))
    }
}
