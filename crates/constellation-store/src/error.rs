//! Error types for the store module.

use constellation_core::CoreError;
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// A CORRUPTED verdict is not an error: it is reported on the retrieved
/// record. These variants cover structural failures only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Core error (canonicalization or record encoding).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// A stored payload could not be parsed back into a record.
    #[error("malformed record at {handle}: {reason}")]
    MalformedRecord { handle: String, reason: String },

    /// A handle that is not a hex integrity hash.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// The backend lock was poisoned by a panicking writer.
    #[error("backend lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// True when the store holds structurally corrupt bytes.
    pub fn is_malformed(&self) -> bool {
        matches!(self, StoreError::MalformedRecord { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
