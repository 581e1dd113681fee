//! Integrity hashing: SHA-256 over canonical payload bytes.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::types::IntegrityHash;

/// Compute the SHA-256 digest of raw bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash canonical bytes into an integrity hash.
///
/// Only accepts [`CanonicalBytes`], so every storage key is derived from the
/// normalizer's output and never from an ad-hoc serialization.
pub fn hash(canonical: &CanonicalBytes) -> IntegrityHash {
    IntegrityHash(sha256(canonical.as_bytes()))
}
