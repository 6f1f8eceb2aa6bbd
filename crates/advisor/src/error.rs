//! Error types for text generation.

use thiserror::Error;

/// Errors raised while calling the text generation backend.
///
/// These never reach the HTTP caller: the advisor turns them into a
/// descriptive recommendation string.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// HTTP request to the model provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with an error.
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AdvisorError {
    /// Create a Provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
