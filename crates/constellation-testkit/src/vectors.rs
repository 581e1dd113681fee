//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical form and SHA-256 digest, so any other
//! implementation anchoring into the same store must reproduce them byte for
//! byte.

use constellation_core::{compute_integrity_hash, normalize, Entity, ScopeVersion};

use crate::fixtures::scenario_entity;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub scope: ScopeVersion,
    /// Builds the input entity.
    pub entity: fn() -> Entity,
    pub expected_canonical: &'static str,
    /// Expected integrity hash (lowercase hex).
    pub expected_hash: &'static str,
}

fn rich_entity() -> Entity {
    Entity::builder("surveyor-7", "map the outer belt", "c0ffee")
        .constraint("no-network")
        .constraint("read-only")
        .interface("http")
        .interface("grpc")
        .skill("plan")
        .skill("reason")
        .compute("memory_gb", 1.5)
        .compute("cpu", 4)
        .compute("accelerators", vec!["gpu"])
        .summary("boot")
        .summary("first contact")
        .attachment("kg://notes/1")
        .build()
}

fn empty_entity() -> Entity {
    Entity::builder("blank", "", "").build()
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "reference agent, current scope",
            scope: ScopeVersion::V2,
            entity: scenario_entity,
            expected_canonical: r#"{"capabilities":{"compute_profile":{"cpu":2},"interfaces":["http"],"skills":["reason"]},"intent":{"constraints":["no-kernel"],"mission":"explore"},"memory_state":{"attachments":[],"continuity_hash":"abc","summaries":[]}}"#,
            expected_hash: "7e25de51bad1c870dc89cb82f4cd9f6d2e2555b5456b7bad4cf2f6ff62d807e6",
        },
        GoldenVector {
            name: "reference agent, legacy scope",
            scope: ScopeVersion::V1,
            entity: scenario_entity,
            expected_canonical: r#"{"capabilities":{"compute_profile":{"cpu":2},"interfaces":["http"],"skills":["reason"]},"intent":{"constraints":["no-kernel"],"interfaces":["http"],"mission":"explore"},"memory_state":{"attachments":[],"continuity_hash":"abc","summaries":[]}}"#,
            expected_hash: "9e2a052a2f77a0f65450982dc20205a5d60583b6526d961ced81b04ee32524ef",
        },
        GoldenVector {
            name: "every list and map populated",
            scope: ScopeVersion::V2,
            entity: rich_entity,
            expected_canonical: r#"{"capabilities":{"compute_profile":{"accelerators":["gpu"],"cpu":4,"memory_gb":1.5},"interfaces":["http","grpc"],"skills":["plan","reason"]},"intent":{"constraints":["no-network","read-only"],"mission":"map the outer belt"},"memory_state":{"attachments":["kg://notes/1"],"continuity_hash":"c0ffee","summaries":["boot","first contact"]}}"#,
            expected_hash: "20ae4f56f1216ee09136dd6ea19d3152517167339386dcca83ee64ee2003bcfc",
        },
        GoldenVector {
            name: "all fields empty",
            scope: ScopeVersion::V2,
            entity: empty_entity,
            expected_canonical: r#"{"capabilities":{"compute_profile":{},"interfaces":[],"skills":[]},"intent":{"constraints":[],"mission":""},"memory_state":{"attachments":[],"continuity_hash":"","summaries":[]}}"#,
            expected_hash: "1c617371c660f9af86ccd14b933d84d63aa1034247900a98ca2d66efc063c5c9",
        },
    ]
}

/// Check every vector, returning `(name, matches, actual_hash_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let entity = (v.entity)();
            let actual = compute_integrity_hash(&entity, v.scope)
                .map(|h| h.to_hex())
                .unwrap_or_default();
            let canonical_matches = normalize(&entity, v.scope)
                .map(|c| c.as_str() == v.expected_canonical)
                .unwrap_or(false);
            let matches = canonical_matches && actual == v.expected_hash;
            (v.name.to_string(), matches, actual)
        })
        .collect()
}
