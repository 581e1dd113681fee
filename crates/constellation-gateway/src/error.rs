//! Error types for the Gateway.

use constellation_store::StoreError;
use thiserror::Error;

use crate::manifest::ManifestError;
use crate::sandbox::SandboxError;

/// Errors that can occur during Gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The manifest failed to parse or validate.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The sandbox factory refused or failed to provision.
    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    /// A message arrived from an agent with no registered session.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The session registry lock was poisoned.
    #[error("session registry lock poisoned")]
    LockPoisoned,

    /// Configuration could not be loaded.
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
}

/// Result type for Gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
