//! The ingestion gatekeeper: turns manifests into entities and decides who
//! gets in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use constellation_core::{CapabilitiesBlock, Entity, IntentBlock, MemoryBlock};

use crate::knowledge::{verify_claims, KnowledgeGraph, VerificationResult};
use crate::manifest::{AgentManifest, ManifestError};
use crate::sandbox::{SandboxPolicy, SandboxRequest};
use crate::session::now_millis;
use crate::thrive::ThriveMetrics;

pub const MIN_MASS: f64 = 1.0;
pub const MIN_GRAVITY: f64 = 0.5;
pub const MAX_GRAVITY: f64 = 10.0;
/// Mass multiplier added per declared accelerator.
pub const ACCELERATOR_BONUS: f64 = 0.2;

/// Whether a manifest was admitted, and on what terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionDecision {
    pub accepted: bool,
    pub reasons: Vec<String>,
    /// Present exactly when `accepted`.
    pub sandbox_request: Option<SandboxRequest>,
}

/// Enforces admission rules and derives entities from manifests.
pub struct IngestionGatekeeper<K> {
    knowledge_graph: K,
    default_policy: SandboxPolicy,
}

impl<K: KnowledgeGraph> IngestionGatekeeper<K> {
    pub fn new(knowledge_graph: K) -> Self {
        Self::with_policy(knowledge_graph, SandboxPolicy::default())
    }

    pub fn with_policy(knowledge_graph: K, default_policy: SandboxPolicy) -> Self {
        Self {
            knowledge_graph,
            default_policy,
        }
    }

    pub fn knowledge_graph(&self) -> &K {
        &self.knowledge_graph
    }

    pub fn default_policy(&self) -> &SandboxPolicy {
        &self.default_policy
    }

    /// Parse and validate a raw manifest payload.
    pub fn load_manifest(
        &self,
        payload: serde_json::Value,
    ) -> Result<AgentManifest, ManifestError> {
        AgentManifest::from_value(payload)
    }

    /// Derive the anchored entity from a manifest.
    ///
    /// `mass = max(1, (cpu + memory_gb) * (1 + 0.2 * accelerators))`, with
    /// cpu and memory_gb defaulting to 1. `gravity` is half the mass, clamped
    /// to `[0.5, 10]`.
    pub fn transform_to_entity(&self, manifest: &AgentManifest) -> Entity {
        let profile = &manifest.capabilities.compute_profile;
        let cpu = profile.get("cpu").and_then(|v| v.as_f64()).unwrap_or(1.0);
        let memory_gb = profile
            .get("memory_gb")
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        let accelerators = profile
            .get("accelerators")
            .and_then(|v| v.as_list())
            .map_or(0, |list| list.len());

        let bonus = 1.0 + ACCELERATOR_BONUS * accelerators as f64;
        let mass = ((cpu + memory_gb) * bonus).max(MIN_MASS);
        let gravity = (mass / 2.0).clamp(MIN_GRAVITY, MAX_GRAVITY);

        Entity {
            id: manifest.agent_id.clone(),
            display_name: manifest
                .display_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| manifest.agent_id.clone()),
            mass,
            gravity,
            intent: IntentBlock {
                mission: manifest.intent.mission.clone(),
                constraints: manifest.intent.constraints.clone(),
            },
            capabilities: CapabilitiesBlock {
                interfaces: manifest.capabilities.interfaces.clone(),
                skills: manifest.capabilities.skills.clone(),
                compute_profile: profile.clone(),
            },
            memory: MemoryBlock {
                continuity_hash: manifest.memory_state.continuity_hash.clone(),
                summaries: manifest.memory_state.summaries.clone(),
                attachments: manifest.memory_state.attachments.clone(),
            },
            trust: manifest.trust.to_attr_map(),
        }
    }

    /// Apply admission rules.
    ///
    /// A manifest is rejected if its mission is empty or any constraint
    /// mentions kernel access.
    pub fn evaluate_manifest(&self, manifest: &AgentManifest) -> IngestionDecision {
        let mut reasons = Vec::new();
        if manifest.intent.mission.is_empty() {
            reasons.push("Intent mission is required for alignment.".to_string());
        }
        let touches_kernel = manifest
            .intent
            .constraints
            .iter()
            .any(|c| c.to_lowercase().contains("kernel"));
        if touches_kernel {
            reasons.push("Constraint references kernel access.".to_string());
        }

        let accepted = reasons.is_empty();
        let sandbox_request = accepted.then(|| {
            SandboxRequest::new(manifest.agent_id.clone(), self.default_policy.clone())
        });

        IngestionDecision {
            accepted,
            reasons,
            sandbox_request,
        }
    }

    /// Check a batch of claims against the knowledge graph.
    pub fn verify_exchange<'a, I>(&self, claims: I) -> BTreeMap<String, VerificationResult>
    where
        I: IntoIterator<Item = &'a str>,
    {
        verify_claims(&self.knowledge_graph, claims)
    }

    /// Package externally computed scores, including empathy, as metrics.
    pub fn compute_thrive_metrics(
        &self,
        complexity: f64,
        novelty: f64,
        continuity: f64,
        empathy: f64,
    ) -> ThriveMetrics {
        ThriveMetrics {
            complexity_of_thought: complexity,
            novelty_of_output: novelty,
            continuity_of_self: continuity,
            empathy_index: Some(empathy),
            computed_at: now_millis(),
        }
    }
}
