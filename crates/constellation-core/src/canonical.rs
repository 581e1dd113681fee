//! Canonical JSON encoding of an entity's integrity scope.
//!
//! The canonical form is compact JSON with these rules:
//! - Object keys sorted lexicographically (by UTF-8 bytes) at every level
//! - No whitespace
//! - List order preserved exactly as given
//! - Integers and floats keep their kind (`2` vs `2.0`)
//! - UTF-8 output; strings are escaped by `serde_json`
//!
//! Non-ASCII text is written as raw UTF-8, not as `\uXXXX` escapes. Only
//! `"`, `\` and control characters are escaped. Hashes of entities with
//! non-ASCII text therefore differ from an `ensure_ascii` encoder's.
//!
//! The scope and this encoding are FROZEN per [`ScopeVersion`]. Changing which
//! fields are covered changes every hash, so it must be a new version.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::crypto;
use crate::entity::{AttrMap, Entity};
use crate::error::{CoreError, Result};
use crate::types::IntegrityHash;

/// Top-level canonical keys.
mod keys {
    pub const INTENT: &str = "intent";
    pub const CAPABILITIES: &str = "capabilities";
    pub const MEMORY: &str = "memory_state";
}

/// Which fields the integrity hash covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeVersion {
    /// Historical "atmosphere" scope: the intent group also carries the
    /// capability interface list.
    V1,
    /// Intent group is `{mission, constraints}` only.
    #[default]
    V2,
}

impl ScopeVersion {
    /// The latest scope.
    pub const CURRENT: Self = ScopeVersion::V2;

    pub fn as_u8(self) -> u8 {
        match self {
            ScopeVersion::V1 => 1,
            ScopeVersion::V2 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ScopeVersion::V1),
            2 => Some(ScopeVersion::V2),
            _ => None,
        }
    }
}

/// Bytes produced only by [`normalize`].
///
/// The inner buffer is private, so anything that hashes `CanonicalBytes`
/// is guaranteed to hash the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Extract the integrity scope of an entity and encode it canonically.
pub fn normalize(entity: &Entity, scope: ScopeVersion) -> Result<CanonicalBytes> {
    let value = scope_value(entity, scope)?;
    let mut buf = Vec::with_capacity(256);
    write_canonical(&mut buf, &value)?;
    let text = String::from_utf8(buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(CanonicalBytes(text))
}

/// `hash(normalize(entity))`: the storage key of an entity.
pub fn compute_integrity_hash(entity: &Entity, scope: ScopeVersion) -> Result<IntegrityHash> {
    let canonical = normalize(entity, scope)?;
    Ok(crypto::hash(&canonical))
}

/// Build the three-group scope document.
fn scope_value(entity: &Entity, scope: ScopeVersion) -> Result<Value> {
    let mut intent = Map::new();
    intent.insert("mission".into(), json!(entity.intent.mission));
    intent.insert("constraints".into(), json!(entity.intent.constraints));
    if scope == ScopeVersion::V1 {
        intent.insert("interfaces".into(), json!(entity.capabilities.interfaces));
    }

    let capabilities = json!({
        "interfaces": entity.capabilities.interfaces,
        "skills": entity.capabilities.skills,
        "compute_profile": attr_map_value(&entity.capabilities.compute_profile, "compute_profile")?,
    });

    let memory = json!({
        "continuity_hash": entity.memory.continuity_hash,
        "summaries": entity.memory.summaries,
        "attachments": entity.memory.attachments,
    });

    let mut root = Map::new();
    root.insert(keys::INTENT.into(), Value::Object(intent));
    root.insert(keys::CAPABILITIES.into(), capabilities);
    root.insert(keys::MEMORY.into(), memory);
    Ok(Value::Object(root))
}

fn attr_map_value(map: &AttrMap, field: &str) -> Result<Value> {
    let mut out = Map::new();
    for (key, value) in map {
        out.insert(key.clone(), value.to_json(&format!("{field}.{key}"))?);
    }
    Ok(Value::Object(out))
}

/// Recursively encode a JSON value canonically.
///
/// Sorting is done here rather than relying on `serde_json::Map` ordering,
/// which changes if any crate in the build enables `preserve_order`.
fn write_canonical(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            buf.push(b'{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_scalar(buf, &Value::String(key.clone()))?;
                buf.push(b':');
                write_canonical(buf, value)?;
            }
            buf.push(b'}');
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_canonical(buf, item)?;
            }
            buf.push(b']');
        }
        scalar => write_scalar(buf, scalar)?,
    }
    Ok(())
}

fn write_scalar(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    serde_json::to_writer(&mut *buf, value).map_err(|e| CoreError::EncodingError(e.to_string()))
}
