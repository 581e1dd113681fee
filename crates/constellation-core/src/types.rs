//! Strong type definitions for the Constellation.
//!
//! The integrity hash is a newtype so a handle cannot be confused with an
//! entity identifier at compile time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A 32-byte integrity hash, computed as SHA-256(canonical payload).
///
/// This is the content-address of an anchored record and the only value
/// that can address it. It is not an identifier of the entity: two entities
/// sharing an `id` but differing in integrity-scoped content hash differently.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntegrityHash(pub [u8; 32]);

impl IntegrityHash {
    /// Length of the lowercase hex form.
    pub const HEX_LEN: usize = 64;

    /// Create a new IntegrityHash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        if s.len() != Self::HEX_LEN {
            return Err(CoreError::InvalidHash(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidHash(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for IntegrityHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for IntegrityHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for IntegrityHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for IntegrityHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IntegrityHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_hash_hex_roundtrip() {
        let hash = IntegrityHash::from_bytes([0x42; 32]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), IntegrityHash::HEX_LEN);
        let recovered = IntegrityHash::from_hex(&hex).unwrap();
        assert_eq!(hash, recovered);
    }

    #[test]
    fn test_integrity_hash_display_is_full_hex() {
        let hash = IntegrityHash::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
    }

    #[test]
    fn test_integrity_hash_debug_is_truncated() {
        let hash = IntegrityHash::from_bytes([0xcd; 32]);
        assert_eq!(format!("{:?}", hash), "IntegrityHash(cdcdcdcdcdcdcdcd)");
    }

    #[test]
    fn test_rejects_wrong_length_and_non_hex() {
        assert!(IntegrityHash::from_hex("abcd").is_err());
        assert!(IntegrityHash::from_hex(&"zz".repeat(32)).is_err());
        assert!("not a hash".parse::<IntegrityHash>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = IntegrityHash::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: IntegrityHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
