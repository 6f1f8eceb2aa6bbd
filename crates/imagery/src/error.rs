//! Error types for image provider operations.

use thiserror::Error;

/// Errors surfaced by the image provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No imagery could be resolved for the requested window.
    #[error("failed to retrieve imagery: {0}")]
    ImageRetrieval(String),

    /// Region reduction failed.
    #[error("region reduction failed: {0}")]
    Reduction(String),

    /// Map credential issuance failed.
    #[error("map credential issuance failed: {0}")]
    Credential(String),

    /// Every pixel in the region was masked (clouds, no coverage).
    #[error("no valid pixels: {0}")]
    NoValidPixels(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The request never reached the backend or the connection dropped.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend response could not be decoded.
    #[error("invalid backend response: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create an ImageRetrieval error.
    pub fn image_retrieval(msg: impl Into<String>) -> Self {
        Self::ImageRetrieval(msg.into())
    }

    /// Create a Reduction error.
    pub fn reduction(msg: impl Into<String>) -> Self {
        Self::Reduction(msg.into())
    }

    /// Create a Credential error.
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a NoValidPixels error.
    pub fn no_valid_pixels(msg: impl Into<String>) -> Self {
        Self::NoValidPixels(msg.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for image provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
