//! Validation errors for field requests.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised while validating a field request, before any provider call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid field geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid analysis period: {0}")]
    InvalidPeriod(String),

    #[error("Unknown map layer: {0}")]
    UnknownLayer(String),
}

impl FieldError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            FieldError::UnknownLayer(_) => 404,
            _ => 400,
        }
    }
}
