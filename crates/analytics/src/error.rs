//! Error types for analytics operations.

use field_common::FieldError;
use imagery::ProviderError;
use thiserror::Error;

/// Errors surfaced by an analytics operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The request was rejected before any provider call.
    #[error(transparent)]
    Validation(#[from] FieldError),

    /// A provider call failed and the step had no fallback.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalyticsError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller sent a bad request.
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalyticsError::Validation(_))
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AnalyticsError::Validation(e) => e.http_status_code(),
            _ => 500,
        }
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
