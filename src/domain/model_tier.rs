use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::TranscriptionMode;

/// Upper bound (exclusive) of the audio duration routed to `Small` in auto mode.
pub const AUTO_SMALL_MAX_SECS: f64 = 30.0;
/// Upper bound (exclusive) of the audio duration routed to `Medium` in auto mode.
pub const AUTO_MEDIUM_MAX_SECS: f64 = 90.0;

/// Discrete transcription model sizes a worker can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Small,
    Medium,
    Base,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Small => "small",
            ModelTier::Medium => "medium",
            ModelTier::Base => "base",
        }
    }

    /// Chooses the tier for a job.
    ///
    /// Explicit modes map `fast -> small`, `balanced -> medium`,
    /// `accurate -> base`. This mapping is kept as deployed even though it is
    /// not ordered by model size. `Auto` picks by duration: under 30s small,
    /// under 90s medium, otherwise base.
    pub fn select(mode: TranscriptionMode, duration_secs: f64) -> Self {
        match mode {
            TranscriptionMode::Fast => ModelTier::Small,
            TranscriptionMode::Balanced => ModelTier::Medium,
            TranscriptionMode::Accurate => ModelTier::Base,
            TranscriptionMode::Auto => Self::for_duration(duration_secs),
        }
    }

    pub fn for_duration(duration_secs: f64) -> Self {
        if duration_secs < AUTO_SMALL_MAX_SECS {
            ModelTier::Small
        } else if duration_secs < AUTO_MEDIUM_MAX_SECS {
            ModelTier::Medium
        } else {
            ModelTier::Base
        }
    }
}

impl FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(ModelTier::Small),
            "medium" => Ok(ModelTier::Medium),
            "base" => Ok(ModelTier::Base),
            _ => Err(format!("Invalid model tier: {}", s)),
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
