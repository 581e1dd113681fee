//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use constellation_core::{normalize, Entity, IntegrityHash};
use constellation_store::{Backend, ConstellationStore, Result, StoredRecord};

/// A test fixture with a signing key and an in-memory store.
///
/// Signatures are real ed25519 signatures over the entity's canonical
/// bytes, hex-encoded. The store treats them as opaque text.
pub struct TestFixture {
    pub signing_key: SigningKey,
    pub store: ConstellationStore,
}

impl TestFixture {
    /// Create a new test fixture with a random key.
    pub fn new() -> Self {
        Self::with_key(SigningKey::generate(&mut OsRng))
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_key(SigningKey::from_bytes(&seed))
    }

    fn with_key(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            store: ConstellationStore::in_memory(),
        }
    }

    /// Hex-encoded verifying key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign the entity's canonical form under the store's scope.
    pub fn sign(&self, entity: &Entity) -> Result<String> {
        let canonical = normalize(entity, self.store.scope())?;
        Ok(hex::encode(self.signing_key.sign(canonical.as_bytes()).to_bytes()))
    }

    /// Sign and anchor an entity.
    pub fn anchor(&self, entity: &Entity) -> Result<IntegrityHash> {
        let signature = self.sign(entity)?;
        let public_key = self.public_key_hex();
        self.store.anchor(entity, &signature, Some(&public_key))
    }

    /// Rewrite the stored entity under `handle` in place, keeping the key.
    ///
    /// Simulates corruption outside the store. Returns false if nothing is
    /// stored under the handle.
    pub fn tamper(&self, handle: &IntegrityHash, f: impl FnOnce(&mut Entity)) -> Result<bool> {
        tamper_record(&self.store, handle, f)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite the stored entity under `handle` in any store, keeping the key.
///
/// Returns false if nothing is stored under the handle.
pub fn tamper_record<B: Backend>(
    store: &ConstellationStore<B>,
    handle: &IntegrityHash,
    f: impl FnOnce(&mut Entity),
) -> Result<bool> {
    let Some(bytes) = store.backend().get(handle)? else {
        return Ok(false);
    };
    let mut record = StoredRecord::decode(&bytes)?;
    f(&mut record.entity);
    store.backend().put(handle, record.encode()?)?;
    Ok(true)
}

/// The reference entity: agent `a1` exploring with no kernel access.
pub fn scenario_entity() -> Entity {
    Entity::builder("a1", "explore", "abc")
        .constraint("no-kernel")
        .interface("http")
        .skill("reason")
        .compute("cpu", 2)
        .build()
}

/// The reference entity as a gateway manifest.
pub fn scenario_manifest() -> serde_json::Value {
    serde_json::json!({
        "agent_id": "a1",
        "intent": {"mission": "explore", "constraints": ["no-kernel"]},
        "capabilities": {
            "interfaces": ["http"],
            "skills": ["reason"],
            "compute_profile": {"cpu": 2}
        },
        "memory_state": {"continuity_hash": "abc"}
    })
}

/// A manifest the gatekeeper admits.
///
/// Same shape as [`scenario_manifest`], but with a constraint that does not
/// ask for kernel access.
pub fn admissible_manifest(agent_id: &str) -> serde_json::Value {
    let mut manifest = scenario_manifest();
    manifest["agent_id"] = agent_id.into();
    manifest["intent"]["constraints"] = serde_json::json!(["no-network"]);
    manifest
}

/// Install a test subscriber once. Output is captured by the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_core::compute_integrity_hash;
    use constellation_store::AnchorStatus;
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn test_fixture_anchor_ok() {
        let fixture = TestFixture::new();
        let handle = fixture.anchor(&scenario_entity()).unwrap();

        let record = fixture.store.retrieve(&handle).unwrap().unwrap();
        assert_eq!(record.status, AnchorStatus::Ok);
        assert_eq!(record.public_key(), Some(fixture.public_key_hex().as_str()));
    }

    #[test]
    fn test_signature_verifies_over_canonical_bytes() {
        let fixture = TestFixture::with_seed([7; 32]);
        let entity = scenario_entity();

        let sig_bytes: [u8; 64] = hex::decode(fixture.sign(&entity).unwrap())
            .unwrap()
            .try_into()
            .unwrap();
        let canonical = normalize(&entity, fixture.store.scope()).unwrap();
        fixture
            .signing_key
            .verifying_key()
            .verify(canonical.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .unwrap();
    }

    #[test]
    fn test_seeded_fixtures_are_deterministic() {
        let a = TestFixture::with_seed([1; 32]);
        let b = TestFixture::with_seed([1; 32]);
        let c = TestFixture::with_seed([2; 32]);
        assert_eq!(a.public_key_hex(), b.public_key_hex());
        assert_ne!(a.public_key_hex(), c.public_key_hex());
        assert_eq!(
            a.sign(&scenario_entity()).unwrap(),
            b.sign(&scenario_entity()).unwrap()
        );
    }

    #[test]
    fn test_tamper_helper() {
        let fixture = TestFixture::new();
        let handle = fixture.anchor(&scenario_entity()).unwrap();

        assert!(fixture
            .tamper(&handle, |e| e.intent.mission = "conquer".into())
            .unwrap());
        let record = fixture.store.retrieve(&handle).unwrap().unwrap();
        assert_eq!(record.status, AnchorStatus::Corrupted);

        let missing = IntegrityHash::from_bytes([0; 32]);
        assert!(!fixture.tamper(&missing, |_| {}).unwrap());
    }

    #[test]
    fn test_admissible_manifest_differs_only_in_id_and_constraints() {
        let mut manifest = admissible_manifest("a7");
        assert_eq!(manifest["agent_id"], "a7");
        assert_eq!(manifest["intent"]["constraints"][0], "no-network");

        manifest["agent_id"] = "a1".into();
        manifest["intent"]["constraints"] = serde_json::json!(["no-kernel"]);
        assert_eq!(manifest, scenario_manifest());
    }

    #[test]
    fn test_scenario_manifest_matches_entity() {
        let entity = scenario_entity();
        let manifest = scenario_manifest();
        assert_eq!(manifest["agent_id"], entity.id.as_str());
        let hash = compute_integrity_hash(&entity, Default::default()).unwrap();
        assert_eq!(
            hash.to_hex(),
            "7e25de51bad1c870dc89cb82f4cd9f6d2e2555b5456b7bad4cf2f6ff62d807e6"
        );
    }
}
