//! Error types for promptforge.

use thiserror::Error;

/// Result type for fallible promptforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Errors raised at the edges of the toolkit (files, settings, requests, images).
///
/// Variation operations themselves never fail.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// IO error (config, batch files, reports)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or encode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML encode error
    #[error("Config encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A generation setting or processing step is out of range
    #[error("Invalid {field}: {reason}")]
    InvalidSettings { field: &'static str, reason: String },

    /// A generation request needs a non-blank prompt
    #[error("Prompt is empty")]
    EmptyPrompt,
}

impl ForgeError {
    /// Create an invalid settings error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            field,
            reason: reason.into(),
        }
    }
}
