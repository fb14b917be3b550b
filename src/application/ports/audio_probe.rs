use std::path::Path;

use async_trait::async_trait;

#[async_trait]
pub trait AudioProbe: Send + Sync {
    async fn duration_secs(&self, audio_path: &Path) -> Result<f64, AudioProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioProbeError {
    #[error("unreadable audio: {0}")]
    Unreadable(String),
    #[error("duration unavailable: {0}")]
    DurationUnavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
