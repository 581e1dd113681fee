//! Proptest generators for property-based testing.

use proptest::prelude::*;

use constellation_core::{Entity, ScopeVersion};

/// Generate an identifier-like string.
pub fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_map(String::from)
}

/// Generate free text, including non-ASCII.
pub fn text() -> impl Strategy<Value = String> {
    "\\PC{0,24}".prop_map(String::from)
}

/// Generate an ordered list of short strings.
pub fn string_list(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(ident(), 0..=max_len)
}

/// Generate a scope version.
pub fn scope_version() -> impl Strategy<Value = ScopeVersion> {
    prop_oneof![Just(ScopeVersion::V1), Just(ScopeVersion::V2)]
}

/// Generate a finite, non-negative float with an exact binary form.
pub fn half_steps() -> impl Strategy<Value = f64> {
    (0u32..=128).prop_map(|n| n as f64 / 2.0)
}

/// Parameters for generating an entity.
#[derive(Debug, Clone)]
pub struct EntityParams {
    pub id: String,
    pub display_name: String,
    pub mass: f64,
    pub gravity: f64,
    pub mission: String,
    pub constraints: Vec<String>,
    pub interfaces: Vec<String>,
    pub skills: Vec<String>,
    pub cpu: Option<i64>,
    pub memory_gb: Option<f64>,
    pub accelerators: Vec<String>,
    pub continuity_hash: String,
    pub summaries: Vec<String>,
    pub attachments: Vec<String>,
    pub provenance: Vec<String>,
}

impl Arbitrary for EntityParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let identity = (ident(), text(), half_steps(), half_steps());
        let intent = (text(), string_list(4));
        let capabilities = (
            string_list(3),
            string_list(3),
            prop::option::of(0i64..=256),
            prop::option::of(half_steps()),
            string_list(2),
        );
        let summaries = prop::collection::vec(text(), 0..=3);
        let memory = (ident(), summaries, string_list(3));
        (identity, intent, capabilities, memory, string_list(2))
            .prop_map(
                |(
                    (id, display_name, mass, gravity),
                    (mission, constraints),
                    (interfaces, skills, cpu, memory_gb, accelerators),
                    (continuity_hash, summaries, attachments),
                    provenance,
                )| EntityParams {
                    id,
                    display_name,
                    mass,
                    gravity,
                    mission,
                    constraints,
                    interfaces,
                    skills,
                    cpu,
                    memory_gb,
                    accelerators,
                    continuity_hash,
                    summaries,
                    attachments,
                    provenance,
                },
            )
            .boxed()
    }
}

/// Build an entity from parameters.
pub fn entity_from_params(params: &EntityParams) -> Entity {
    let mut builder = Entity::builder(&params.id, &params.mission, &params.continuity_hash)
        .display_name(&params.display_name)
        .mass(params.mass)
        .gravity(params.gravity);

    for c in &params.constraints {
        builder = builder.constraint(c);
    }
    for i in &params.interfaces {
        builder = builder.interface(i);
    }
    for s in &params.skills {
        builder = builder.skill(s);
    }
    if let Some(cpu) = params.cpu {
        builder = builder.compute("cpu", cpu);
    }
    if let Some(memory_gb) = params.memory_gb {
        builder = builder.compute("memory_gb", memory_gb);
    }
    if !params.accelerators.is_empty() {
        builder = builder.compute("accelerators", params.accelerators.clone());
    }
    for s in &params.summaries {
        builder = builder.summary(s);
    }
    for a in &params.attachments {
        builder = builder.attachment(a);
    }
    if !params.provenance.is_empty() {
        builder = builder.trust("provenance", params.provenance.clone());
    }
    builder.build()
}
