use std::fmt;

/// Progress of a single broker delivery through the worker.
///
/// `received -> decoding -> processing -> {acked, nacked}`; `decoding` may
/// also go straight to `nacked`. A redelivery starts over at `received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryState {
    Received,
    Decoding,
    Processing,
    Acked,
    Nacked,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Received => "received",
            DeliveryState::Decoding => "decoding",
            DeliveryState::Processing => "processing",
            DeliveryState::Acked => "acked",
            DeliveryState::Nacked => "nacked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryState::Acked | DeliveryState::Nacked)
    }

    pub fn can_advance_to(&self, next: DeliveryState) -> bool {
        use DeliveryState::*;
        matches!(
            (*self, next),
            (Received, Decoding)
                | (Decoding, Processing)
                | (Decoding, Nacked)
                | (Processing, Acked)
                | (Processing, Nacked)
        )
    }

    pub fn advance(self, next: DeliveryState) -> Result<DeliveryState, InvalidTransition> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid delivery transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: DeliveryState,
    pub to: DeliveryState,
}
