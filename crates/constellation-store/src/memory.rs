//! In-memory implementation of the Backend trait.
//!
//! All data is lost when the backend is dropped. The map grows without
//! bound; there is no eviction.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use constellation_core::IntegrityHash;

use crate::error::{Result, StoreError};
use crate::traits::{Backend, PutResult};

/// In-memory backend. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<IntegrityHash, Bytes>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<IntegrityHash, Bytes>>> {
        self.records.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<IntegrityHash, Bytes>>> {
        self.records.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Backend for MemoryBackend {
    fn put(&self, key: &IntegrityHash, record: Bytes) -> Result<PutResult> {
        let mut records = self.write()?;
        Ok(match records.insert(*key, record) {
            Some(previous) => PutResult::Replaced { previous },
            None => PutResult::Inserted,
        })
    }

    fn get(&self, key: &IntegrityHash) -> Result<Option<Bytes>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn has(&self, key: &IntegrityHash) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<IntegrityHash>> {
        let mut keys: Vec<IntegrityHash> = self.read()?.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
