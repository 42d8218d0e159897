use thiserror::Error;

/// Main error type for the WebVTT engine
///
/// Each variant maps to one recovery granularity: a `DocumentFormat` error
/// rejects a whole payload, a `CueFormat` error drops one cue, and the
/// setting-level variants only cost the affected field its value.
#[derive(Error, Debug)]
pub enum WebVttError {
    #[error("Bad WEBVTT document: {0}")]
    DocumentFormat(String),

    #[error("Bad cue header: {0}")]
    CueFormat(String),

    #[error("Bad setting {key}:{value}: {reason}")]
    Setting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Bad percentage: {0}")]
    Percentage(String),

    #[error("Bad timestamp: {0}")]
    Timestamp(String),

    #[error("Region not found: {0}")]
    RegionMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl WebVttError {
    pub(crate) fn setting(key: &str, value: &str, reason: impl Into<String>) -> Self {
        WebVttError::Setting {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WebVttError>;
