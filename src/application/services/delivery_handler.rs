use std::sync::Arc;

use tracing::Instrument;

use crate::application::ports::{AckError, Acknowledger};
use crate::domain::{DeliveryState, JobDescriptor};

use super::transcription_pipeline::TranscriptionPipeline;

/// How a delivery was settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Ack,
    Nack { requeue: bool },
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
}

/// Broker-agnostic consumer logic: decode, process, settle.
///
/// Any job the pipeline drives to a recorded terminal status is acked, failed
/// jobs included, so poison messages are not redelivered forever. Bodies that
/// do not decode are nacked without touching any job record. A job whose
/// failure could not be recorded is nacked with requeue so it is retried once
/// storage recovers, unless its record was deleted; that delivery is acked.
pub struct DeliveryHandler {
    pipeline: Arc<TranscriptionPipeline>,
    requeue_malformed: bool,
}

impl DeliveryHandler {
    pub fn new(pipeline: Arc<TranscriptionPipeline>, requeue_malformed: bool) -> Self {
        Self {
            pipeline,
            requeue_malformed,
        }
    }

    pub async fn handle(
        &self,
        body: &[u8],
        acknowledger: &dyn Acknowledger,
    ) -> Result<Settlement, AckError> {
        let mut state = DeliveryState::Received;
        state = self.transition(state, DeliveryState::Decoding);

        let descriptor = match decode(body) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(error = %e, bytes = body.len(), "Rejecting undecodable delivery");
                self.transition(state, DeliveryState::Nacked);
                let settlement = Settlement::Nack {
                    requeue: self.requeue_malformed,
                };
                return settle(acknowledger, settlement).await;
            }
        };

        let span = tracing::info_span!(
            "transcription_job",
            audio_id = %descriptor.audio_id,
            object_name = %descriptor.object_name,
            mode = %descriptor.mode,
        );

        state = self.transition(state, DeliveryState::Processing);
        let settlement = match self.pipeline.process(&descriptor).instrument(span).await {
            Ok(_) => Settlement::Ack,
            Err(e) if !e.is_transient() => {
                tracing::warn!(
                    error = %e,
                    audio_id = %descriptor.audio_id,
                    "Job record gone, discarding delivery"
                );
                Settlement::Ack
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    audio_id = %descriptor.audio_id,
                    "Job outcome not recorded, requeueing"
                );
                Settlement::Nack { requeue: true }
            }
        };

        let terminal = match settlement {
            Settlement::Ack => DeliveryState::Acked,
            Settlement::Nack { .. } => DeliveryState::Nacked,
        };
        self.transition(state, terminal);
        settle(acknowledger, settlement).await
    }

    fn transition(&self, from: DeliveryState, to: DeliveryState) -> DeliveryState {
        match from.advance(to) {
            Ok(next) => {
                tracing::debug!(from = %from, to = %next, "Delivery state transition");
                next
            }
            Err(e) => {
                tracing::error!(error = %e, "Unexpected delivery state transition");
                to
            }
        }
    }
}

fn decode(body: &[u8]) -> Result<JobDescriptor, DeliveryError> {
    Ok(JobDescriptor::from_json(body)?)
}

async fn settle(
    acknowledger: &dyn Acknowledger,
    settlement: Settlement,
) -> Result<Settlement, AckError> {
    match settlement {
        Settlement::Ack => acknowledger.ack().await?,
        Settlement::Nack { requeue } => acknowledger.nack(requeue).await?,
    }
    Ok(settlement)
}
