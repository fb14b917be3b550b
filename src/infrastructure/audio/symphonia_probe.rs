use std::path::Path;

use async_trait::async_trait;

use crate::application::ports::{AudioProbe, AudioProbeError};

use super::audio_decoder::probe_duration;

/// Reads the duration from the container headers, decoding packets only when
/// the header has no frame count.
pub struct SymphoniaProbe;

#[async_trait]
impl AudioProbe for SymphoniaProbe {
    async fn duration_secs(&self, audio_path: &Path) -> Result<f64, AudioProbeError> {
        let path = audio_path.to_path_buf();
        tokio::task::spawn_blocking(move || probe_duration(&path))
            .await
            .map_err(|e| AudioProbeError::DurationUnavailable(format!("probe task: {}", e)))?
    }
}
