use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::application::ports::{ModelLoader, TranscriptionEngine, TranscriptionError};
use crate::domain::ModelTier;

struct LoadedModel {
    tier: ModelTier,
    engine: Arc<dyn TranscriptionEngine>,
}

/// Per-worker memo of the last loaded transcription model.
///
/// A single slot: at most one tier is resident at a time. `acquire` holds the
/// slot until the returned lease is dropped, so a job asking for another tier
/// waits for the current user to finish before the model is swapped.
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    slot: Arc<Mutex<Option<LoadedModel>>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn acquire(&self, tier: ModelTier) -> Result<ModelLease, TranscriptionError> {
        let mut slot = Arc::clone(&self.slot).lock_owned().await;

        let engine = match slot.as_ref() {
            Some(loaded) if loaded.tier == tier => {
                tracing::debug!(tier = %tier, "Reusing loaded transcription model");
                Arc::clone(&loaded.engine)
            }
            _ => {
                if let Some(previous) = slot.take() {
                    tracing::info!(from = %previous.tier, to = %tier, "Swapping transcription model");
                }
                let engine = self.loader.load(tier).await?;
                tracing::info!(tier = %tier, "Transcription model loaded");
                *slot = Some(LoadedModel {
                    tier,
                    engine: Arc::clone(&engine),
                });
                engine
            }
        };

        Ok(ModelLease {
            tier,
            engine,
            _slot: slot,
        })
    }

    /// Tier currently resident, if any. Waits for an active lease to be released.
    pub async fn loaded_tier(&self) -> Option<ModelTier> {
        self.slot.lock().await.as_ref().map(|loaded| loaded.tier)
    }
}

/// Exclusive use of the loaded model for the duration of one job.
pub struct ModelLease {
    tier: ModelTier,
    engine: Arc<dyn TranscriptionEngine>,
    _slot: OwnedMutexGuard<Option<LoadedModel>>,
}

impl ModelLease {
    pub fn tier(&self) -> ModelTier {
        self.tier
    }

    pub fn engine(&self) -> &dyn TranscriptionEngine {
        self.engine.as_ref()
    }
}
