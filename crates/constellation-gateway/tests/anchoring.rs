//! Anchoring and tamper detection through the gateway.

use constellation_gateway::core::AttrValue;
use constellation_gateway::store::{Backend, StoreError};
use constellation_gateway::{
    AnchorStatus, Entity, Gateway, GatewayConfig, GatewayError, InMemoryKnowledgeGraph,
    InMemorySandboxFactory, IntegrityHash, ScopeVersion, StoreConfig,
};
use constellation_testkit::{init_tracing, scenario_manifest, tamper_record, verify_all_vectors};
use serde_json::json;

type TestGateway = Gateway<InMemoryKnowledgeGraph, InMemorySandboxFactory>;

const SCENARIO_HASH: &str = "7e25de51bad1c870dc89cb82f4cd9f6d2e2555b5456b7bad4cf2f6ff62d807e6";

fn gateway_with_scope(scope: ScopeVersion) -> TestGateway {
    init_tracing();
    let config = GatewayConfig {
        store: StoreConfig { scope },
        ..GatewayConfig::default()
    };
    Gateway::in_memory(
        InMemoryKnowledgeGraph::new(),
        InMemorySandboxFactory::new(),
        config,
    )
}

fn gateway() -> TestGateway {
    gateway_with_scope(ScopeVersion::V2)
}

fn tamper(gw: &TestGateway, handle: &IntegrityHash, f: impl FnOnce(&mut Entity)) {
    assert!(tamper_record(gw.store(), handle, f).unwrap());
}

#[test]
fn golden_vectors_match() {
    for (name, matches, actual) in verify_all_vectors() {
        assert!(matches, "vector '{name}' produced {actual}");
    }
}

#[test]
fn scenario_anchor_then_tamper() {
    let gw = gateway();
    let handle = gw
        .anchor_manifest(scenario_manifest(), "sig1", Some("pk1"))
        .unwrap();
    assert_eq!(handle.to_hex(), SCENARIO_HASH);

    let record = gw.retrieve(&handle).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Ok);
    assert_eq!(record.entity().display_name, "a1");
    assert_eq!(record.entity().mass, 3.0);
    assert_eq!(record.entity().gravity, 1.5);
    assert_eq!(record.signature(), "sig1");
    assert_eq!(record.public_key(), Some("pk1"));

    // Outside the integrity scope.
    tamper(&gw, &handle, |e| e.display_name = "impostor".into());
    let record = gw.retrieve(&handle).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Ok);
    assert_eq!(record.entity().display_name, "impostor");

    tamper(&gw, &handle, |e| e.intent.mission = "exploit".into());
    let record = gw.retrieve(&handle).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Corrupted);
    assert_eq!(record.integrity_hash, handle);
    assert_ne!(record.recalculated_hash, Some(handle));
    assert!(record.recalculated_hash.is_some());
}

const SCOPED_FIELDS: [&str; 7] = [
    "constraints",
    "interfaces",
    "skills",
    "compute_profile",
    "continuity_hash",
    "summaries",
    "attachments",
];

fn forge(field: &str, e: &mut Entity) {
    match field {
        "constraints" => e.intent.constraints.clear(),
        "interfaces" => e.capabilities.interfaces.push("ssh".into()),
        "skills" => e.capabilities.skills.push("persuade".into()),
        "compute_profile" => {
            let profile = &mut e.capabilities.compute_profile;
            profile.insert("cpu".into(), AttrValue::Integer(64));
        }
        "continuity_hash" => e.memory.continuity_hash = "forged".into(),
        "summaries" => e.memory.summaries.push("rewritten history".into()),
        "attachments" => e.memory.attachments.push("kg://planted".into()),
        other => panic!("no forgery for {other}"),
    }
}

#[test]
fn tampered_lists_and_memory_are_detected() {
    let gw = gateway();

    for field in SCOPED_FIELDS {
        let handle = gw
            .anchor_manifest(scenario_manifest(), "sig1", None)
            .unwrap();
        tamper(&gw, &handle, |e| forge(field, e));
        let record = gw.retrieve(&handle).unwrap().unwrap();
        assert_eq!(record.status, AnchorStatus::Corrupted, "{field}");
    }
}

#[test]
fn non_finite_tamper_is_corrupted() {
    let gw = gateway();
    let handle = gw
        .anchor_manifest(scenario_manifest(), "sig1", None)
        .unwrap();
    tamper(&gw, &handle, |e| {
        e.capabilities
            .compute_profile
            .insert("cpu".into(), AttrValue::Float(f64::NAN));
    });

    let record = gw.retrieve(&handle).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Corrupted);
    assert_eq!(record.recalculated_hash, None);
}

#[test]
fn unknown_handles() {
    let gw = gateway();
    let unknown = IntegrityHash::from_bytes([9; 32]);
    assert!(gw.retrieve(&unknown).unwrap().is_none());
    assert!(gw.retrieve_hex(SCENARIO_HASH).unwrap().is_none());

    let err = gw.retrieve_hex("not-a-digest").unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Store(StoreError::InvalidHandle(_))
    ));
}

#[test]
fn malformed_record_is_an_error() {
    let gw = gateway();
    let handle = gw
        .anchor_manifest(scenario_manifest(), "sig1", None)
        .unwrap();
    gw.store()
        .backend()
        .put(&handle, b"\xff\x00garbage".to_vec().into())
        .unwrap();

    match gw.retrieve(&handle) {
        Err(GatewayError::Store(e)) => assert!(e.is_malformed(), "{e}"),
        other => panic!("expected malformed record, got {other:?}"),
    }
}

#[test]
fn same_scope_content_overwrites() {
    let gw = gateway();

    let first = gw
        .anchor_manifest(scenario_manifest(), "sig-old", Some("pk-old"))
        .unwrap();

    let mut renamed = scenario_manifest();
    renamed["display_name"] = json!("Agent One");
    renamed["trust"] = json!({"provenance": ["registry"]});
    let second = gw.anchor_manifest(renamed, "sig-new", None).unwrap();

    assert_eq!(first, second);
    assert_eq!(gw.store().len().unwrap(), 1);

    let record = gw.retrieve(&first).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Ok);
    assert_eq!(record.entity().display_name, "Agent One");
    assert_eq!(record.signature(), "sig-new");
    assert_eq!(record.public_key(), None);
}

#[test]
fn invalid_manifest_is_not_anchored() {
    let gw = gateway();
    let mut payload = scenario_manifest();
    payload["memory_state"] = json!({"continuity_hash": ""});

    let err = gw.anchor_manifest(payload, "sig1", None).unwrap_err();
    assert!(matches!(err, GatewayError::Manifest(_)));
    assert!(gw.store().is_empty().unwrap());
}

#[test]
fn legacy_scope_hashes_differ_and_skew_reads_corrupted() {
    let legacy = gateway_with_scope(ScopeVersion::V1);
    let current = gateway();

    let legacy_handle = legacy
        .anchor_manifest(scenario_manifest(), "sig1", None)
        .unwrap();
    assert_eq!(
        legacy_handle.to_hex(),
        "9e2a052a2f77a0f65450982dc20205a5d60583b6526d961ced81b04ee32524ef"
    );
    assert_eq!(
        legacy.retrieve(&legacy_handle).unwrap().unwrap().status,
        AnchorStatus::Ok
    );

    // Copy the legacy record into a current-scope store under its legacy key.
    let bytes = legacy.store().backend().get(&legacy_handle).unwrap();
    let target = current.store().backend();
    target.put(&legacy_handle, bytes.unwrap()).unwrap();

    let record = current.retrieve(&legacy_handle).unwrap().unwrap();
    assert_eq!(record.status, AnchorStatus::Corrupted);
    assert_eq!(
        record.recalculated_hash.map(|h| h.to_hex()).as_deref(),
        Some(SCENARIO_HASH)
    );
}
