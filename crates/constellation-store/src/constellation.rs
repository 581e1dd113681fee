//! The Constellation: a content-addressed store with tamper detection.
//!
//! `anchor` keys each record by the integrity hash of its entity. `retrieve`
//! re-derives that hash from the stored payload and compares it with the key
//! it was fetched under. A mismatch means the integrity-scoped content changed
//! after anchoring while staying reachable under the old key.
//!
//! The verdict cannot tell tampering apart from a normalizer or hasher change
//! between anchor and retrieve (for example a different [`ScopeVersion`]);
//! both show up as [`AnchorStatus::Corrupted`].

use std::fmt;

use serde::{Deserialize, Serialize};

use constellation_core::{compute_integrity_hash, Entity, IntegrityHash, ScopeVersion};

use crate::error::{Result, StoreError};
use crate::memory::MemoryBackend;
use crate::record::StoredRecord;
use crate::traits::{Backend, PutResult};

/// Configuration for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Integrity scope used for both anchoring and re-verification.
    pub scope: ScopeVersion,
}

/// Integrity verdict of a retrieved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorStatus {
    /// Recomputed hash equals the lookup key.
    Ok,
    /// Recomputed hash differs from the lookup key.
    Corrupted,
}

impl AnchorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorStatus::Ok => "OK",
            AnchorStatus::Corrupted => "CORRUPTED",
        }
    }
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrieved record together with its verification result.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorRecord {
    /// The handle the record was fetched under.
    pub integrity_hash: IntegrityHash,
    /// The full stored payload.
    pub record: StoredRecord,
    pub status: AnchorStatus,
    /// Hash recomputed from the stored entity. `None` when the stored
    /// content cannot be canonicalized at all (always `Corrupted`).
    pub recalculated_hash: Option<IntegrityHash>,
}

impl AnchorRecord {
    pub fn entity(&self) -> &Entity {
        &self.record.entity
    }

    pub fn signature(&self) -> &str {
        &self.record.signature
    }

    pub fn public_key(&self) -> Option<&str> {
        self.record.public_key.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.status == AnchorStatus::Ok
    }
}

/// Content-addressed store of anchored entities.
///
/// Owns its backend; constructed by the composing application and dropped
/// with it. Records are never deleted and there is no eviction.
pub struct ConstellationStore<B: Backend = MemoryBackend> {
    backend: B,
    config: StoreConfig,
}

impl ConstellationStore<MemoryBackend> {
    /// An empty in-memory store with the default configuration.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), StoreConfig::default())
    }
}

impl Default for ConstellationStore<MemoryBackend> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<B: Backend> ConstellationStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// The raw backend. Writes made here bypass hashing entirely.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn scope(&self) -> ScopeVersion {
        self.config.scope
    }

    /// Integrity hash of `entity` under this store's scope.
    pub fn compute_integrity_hash(&self, entity: &Entity) -> Result<IntegrityHash> {
        Ok(compute_integrity_hash(entity, self.config.scope)?)
    }

    /// Anchor an entity and return its handle.
    ///
    /// The signature and public key are stored as given; neither is checked.
    /// A record already stored under the same hash is overwritten.
    pub fn anchor(
        &self,
        entity: &Entity,
        signature: &str,
        public_key: Option<&str>,
    ) -> Result<IntegrityHash> {
        let integrity_hash = self.compute_integrity_hash(entity)?;
        let record = StoredRecord::new(entity.clone(), signature, public_key.map(str::to_string));
        let bytes = record.encode()?;

        match self.backend.put(&integrity_hash, bytes.clone())? {
            PutResult::Inserted => {
                tracing::debug!(
                    handle = %integrity_hash,
                    entity_id = %entity.id,
                    "anchored entity"
                );
            }
            PutResult::Replaced { previous } if previous == bytes => {
                tracing::debug!(
                    handle = %integrity_hash,
                    entity_id = %entity.id,
                    "re-anchored identical record"
                );
            }
            PutResult::Replaced { .. } => {
                tracing::warn!(
                    handle = %integrity_hash,
                    entity_id = %entity.id,
                    "replaced a different record under the same integrity hash"
                );
            }
        }

        Ok(integrity_hash)
    }

    /// Fetch a record and re-verify it.
    ///
    /// Returns `Ok(None)` if nothing is stored under the handle. A record whose
    /// bytes no longer parse fails with [`StoreError::MalformedRecord`].
    pub fn retrieve(&self, integrity_hash: &IntegrityHash) -> Result<Option<AnchorRecord>> {
        let Some(bytes) = self.backend.get(integrity_hash)? else {
            tracing::debug!(handle = %integrity_hash, "no record under handle");
            return Ok(None);
        };

        let record = StoredRecord::decode(&bytes).map_err(|e| StoreError::MalformedRecord {
            handle: integrity_hash.to_hex(),
            reason: e.to_string(),
        })?;

        let recalculated_hash = compute_integrity_hash(&record.entity, self.config.scope).ok();
        let status = if recalculated_hash.as_ref() == Some(integrity_hash) {
            AnchorStatus::Ok
        } else {
            tracing::warn!(
                handle = %integrity_hash,
                entity_id = %record.entity.id,
                recalculated = ?recalculated_hash,
                "integrity check failed"
            );
            AnchorStatus::Corrupted
        };

        Ok(Some(AnchorRecord {
            integrity_hash: *integrity_hash,
            record,
            status,
            recalculated_hash,
        }))
    }

    /// [`retrieve`](Self::retrieve) by hex handle.
    ///
    /// A string that is not a 64-character hex digest is an
    /// [`StoreError::InvalidHandle`]; an unknown valid handle is `Ok(None)`.
    pub fn retrieve_hex(&self, handle: &str) -> Result<Option<AnchorRecord>> {
        let integrity_hash = IntegrityHash::from_hex(handle)
            .map_err(|e| StoreError::InvalidHandle(e.to_string()))?;
        self.retrieve(&integrity_hash)
    }

    /// All handles currently stored, sorted.
    pub fn handles(&self) -> Result<Vec<IntegrityHash>> {
        self.backend.keys()
    }

    pub fn len(&self) -> Result<usize> {
        self.backend.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.backend.is_empty()
    }
}
