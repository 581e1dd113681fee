//! # Constellation Testkit
//!
//! Testing utilities for the Constellation.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known entities with their expected canonical form and digest
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A signing key plus store, tamper helpers, reference inputs
//!
//! ## Golden Vectors
//!
//! ```rust
//! use constellation_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hash) in verify_all_vectors() {
//!     assert!(matches, "{name}: {hash}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use constellation_core::{compute_integrity_hash, ScopeVersion};
//! use constellation_testkit::generators::{entity_from_params, EntityParams};
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(params: EntityParams) {
//!         let e = entity_from_params(&params);
//!         prop_assert_eq!(
//!             compute_integrity_hash(&e, ScopeVersion::V2).unwrap(),
//!             compute_integrity_hash(&e, ScopeVersion::V2).unwrap()
//!         );
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use constellation_testkit::fixtures::{scenario_entity, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let handle = fixture.anchor(&scenario_entity()).unwrap();
//! assert!(fixture.store.retrieve(&handle).unwrap().unwrap().is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    admissible_manifest, init_tracing, scenario_entity, scenario_manifest, tamper_record,
    TestFixture,
};
pub use generators::{entity_from_params, EntityParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
