//! Backend trait: the minimal interface for raw record persistence.
//!
//! The store is storage-agnostic. A backend maps integrity hashes to encoded
//! record bytes and knows nothing about entities or verdicts.

use bytes::Bytes;
use constellation_core::IntegrityHash;

use crate::error::Result;

/// Result of writing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutResult {
    /// Nothing was stored under this key before.
    Inserted,
    /// A record was already stored under this key and has been overwritten.
    Replaced {
        /// The bytes that were overwritten.
        previous: Bytes,
    },
}

/// Key → bytes persistence.
///
/// Each call is atomic: a concurrent `get` observes either no value or one
/// complete `put`. No ordering is promised across keys.
pub trait Backend: Send + Sync {
    /// Store `record` under `key`, overwriting any previous value.
    fn put(&self, key: &IntegrityHash, record: Bytes) -> Result<PutResult>;

    /// Get the bytes stored under `key`.
    fn get(&self, key: &IntegrityHash) -> Result<Option<Bytes>>;

    /// Check if anything is stored under `key`.
    fn has(&self, key: &IntegrityHash) -> Result<bool>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<IntegrityHash>>;

    /// Number of stored records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
