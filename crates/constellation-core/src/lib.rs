//! # Constellation Core
//!
//! Pure primitives for the Constellation: entities, canonical payloads, and
//! integrity hashing.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! entity values.
//!
//! ## Key Types
//!
//! - [`Entity`] - The anchored subject (an agent's derived descriptor)
//! - [`IntegrityHash`] - Content address of an anchored record (SHA-256)
//! - [`ScopeVersion`] - Which entity fields the integrity hash covers
//! - [`CanonicalBytes`] - Deterministic encoding of the integrity scope
//!
//! ## Canonicalization
//!
//! The integrity scope is encoded as key-sorted, whitespace-free JSON. See
//! the [`canonical`] module.
//!
//! ```rust
//! use constellation_core::{compute_integrity_hash, Entity, ScopeVersion};
//!
//! let entity = Entity::builder("a1", "explore", "abc")
//!     .constraint("no-kernel")
//!     .interface("http")
//!     .build();
//! let hash = compute_integrity_hash(&entity, ScopeVersion::CURRENT).unwrap();
//! assert_eq!(hash.to_hex().len(), 64);
//! ```

pub mod canonical;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod types;

pub use canonical::{compute_integrity_hash, normalize, CanonicalBytes, ScopeVersion};
pub use entity::{
    AttrMap, AttrValue, CapabilitiesBlock, Entity, EntityBuilder, IntentBlock, MemoryBlock,
};
pub use error::{CoreError, Result};
pub use types::IntegrityHash;
