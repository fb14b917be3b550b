use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision requested at upload time.
///
/// Decoding never fails: any string outside the named modes becomes `Auto`,
/// which selects the model from the measured audio duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TranscriptionMode {
    Fast,
    Balanced,
    Accurate,
    Auto,
}

impl TranscriptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionMode::Fast => "fast",
            TranscriptionMode::Balanced => "balanced",
            TranscriptionMode::Accurate => "accurate",
            TranscriptionMode::Auto => "auto",
        }
    }
}

impl From<&str> for TranscriptionMode {
    fn from(s: &str) -> Self {
        match s {
            "fast" => TranscriptionMode::Fast,
            "balanced" => TranscriptionMode::Balanced,
            "accurate" => TranscriptionMode::Accurate,
            _ => TranscriptionMode::Auto,
        }
    }
}

impl From<String> for TranscriptionMode {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for TranscriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
