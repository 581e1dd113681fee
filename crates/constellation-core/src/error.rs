//! Error types for the Constellation Core.

use thiserror::Error;

/// Core errors that can occur while normalizing or decoding entities.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid integrity hash: {0}")]
    InvalidHash(String),

    #[error("non-finite number in {0} cannot be canonicalized")]
    NonFiniteNumber(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

impl CoreError {
    /// Shorthand for a record missing a required field.
    pub fn missing(field: &str) -> Self {
        CoreError::MalformedRecord(format!("missing required field `{field}`"))
    }

    /// Shorthand for a record field with the wrong shape.
    pub fn invalid(field: &str, expected: &str) -> Self {
        CoreError::MalformedRecord(format!("field `{field}` is not {expected}"))
    }

    /// True for structural corruption of a stored record.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedRecord(_) | CoreError::DecodingError(_)
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
