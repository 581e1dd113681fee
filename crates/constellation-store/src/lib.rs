//! # Constellation Store
//!
//! Content-addressed storage for anchored entities, with tamper detection on
//! every read.
//!
//! ## Overview
//!
//! [`ConstellationStore`] keys each [`StoredRecord`] by the integrity hash of
//! its entity. Retrieval recomputes that hash from the stored payload and
//! labels the record [`AnchorStatus::Ok`] or [`AnchorStatus::Corrupted`].
//! Raw persistence sits behind the [`Backend`] trait, with
//! [`MemoryBackend`] as the in-process implementation.
//!
//! ## Usage
//!
//! ```rust
//! use constellation_core::Entity;
//! use constellation_store::{AnchorStatus, ConstellationStore};
//!
//! let store = ConstellationStore::in_memory();
//! let entity = Entity::builder("a1", "explore", "abc").build();
//!
//! let handle = store.anchor(&entity, "sig1", Some("pk1")).unwrap();
//! let record = store.retrieve(&handle).unwrap().unwrap();
//! assert_eq!(record.status, AnchorStatus::Ok);
//! ```
//!
//! ## Design Notes
//!
//! - **Last write wins**: anchoring content that hashes to an existing key
//!   overwrites the previous record, even if excluded fields differ
//! - **Not found is not an error**: `retrieve` returns `Ok(None)`
//! - **Corruption is data**: a `Corrupted` verdict is a successful result;
//!   only structurally unreadable records fail
//! - **Unbounded**: nothing is ever evicted

pub mod constellation;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use constellation::{AnchorRecord, AnchorStatus, ConstellationStore, StoreConfig};
pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use record::StoredRecord;
pub use traits::{Backend, PutResult};
