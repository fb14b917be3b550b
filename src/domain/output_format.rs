use std::fmt;

/// Output formats a client may request for the post-processed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Text,
    Summary,
    Keypoints,
    Interview,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Text,
        OutputFormat::Summary,
        OutputFormat::Keypoints,
        OutputFormat::Interview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Summary => "summary",
            OutputFormat::Keypoints => "keypoints",
            OutputFormat::Interview => "interview",
        }
    }

    /// Returns `None` for tags outside the supported set.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == tag)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
