use std::fmt;

use serde::{Deserialize, Serialize};

use super::AudioId;

/// File extensions accepted for upload.
pub const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "m4a"];

/// Key of an uploaded audio file in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectName(String);

impl ObjectName {
    /// Builds `<audio_id>.<ext>` for an uploaded file.
    pub fn for_upload(audio_id: &AudioId, extension: &str) -> Self {
        Self(format!("{}.{}", audio_id.as_uuid(), extension))
    }

    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.0.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some(ext)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the lowercased extension of `filename` when it is an accepted audio type.
pub fn audio_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_AUDIO_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}
