//! The Gateway: one entry point composing gatekeeping, sandboxing, sessions,
//! and the Constellation store.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use constellation_core::IntegrityHash;
use constellation_store::{AnchorRecord, Backend, ConstellationStore, MemoryBackend};

use crate::citation::{AgentMessage, CitationEngine, ClaimVerification};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gatekeeper::IngestionGatekeeper;
use crate::knowledge::KnowledgeGraph;
use crate::sandbox::SandboxFactory;
use crate::session::{AgentSession, SessionRegistry};
use crate::thrive::{ThriveMetrics, ThriveScorer};

/// Result of presenting a manifest at the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Admitted; a sandbox was provisioned and a session registered.
    Admitted(AgentSession),
    /// Turned away by the admission rules.
    Rejected {
        agent_id: String,
        reasons: Vec<String>,
    },
}

impl IngestOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// The main Gateway struct.
///
/// Provides a single API for:
/// - Admitting agents (manifest → decision → sandbox → session)
/// - Anchoring manifests into the Constellation and retrieving them
/// - Verifying message claims from admitted agents
/// - Recording thrive metrics per session
pub struct Gateway<K, F, B: Backend = MemoryBackend> {
    store: ConstellationStore<B>,
    gatekeeper: IngestionGatekeeper<Arc<K>>,
    citations: CitationEngine<Arc<K>>,
    sandboxes: F,
    sessions: RwLock<SessionRegistry>,
    scorer: ThriveScorer,
    config: GatewayConfig,
}

impl<K: KnowledgeGraph, F: SandboxFactory> Gateway<K, F, MemoryBackend> {
    /// A gateway over a fresh in-memory store.
    pub fn in_memory(knowledge_graph: K, sandboxes: F, config: GatewayConfig) -> Self {
        Self::new(MemoryBackend::new(), knowledge_graph, sandboxes, config)
    }
}

impl<K: KnowledgeGraph, F: SandboxFactory, B: Backend> Gateway<K, F, B> {
    /// Create a gateway. The store uses `config.store`.
    pub fn new(backend: B, knowledge_graph: K, sandboxes: F, config: GatewayConfig) -> Self {
        let graph = Arc::new(knowledge_graph);
        Self {
            store: ConstellationStore::new(backend, config.store),
            gatekeeper: IngestionGatekeeper::with_policy(
                Arc::clone(&graph),
                config.sandbox_policy.clone(),
            ),
            citations: CitationEngine::new(graph),
            sandboxes,
            sessions: RwLock::new(SessionRegistry::new()),
            scorer: ThriveScorer::new(config.thrive_weights),
            config,
        }
    }

    pub fn store(&self) -> &ConstellationStore<B> {
        &self.store
    }

    pub fn gatekeeper(&self) -> &IngestionGatekeeper<Arc<K>> {
        &self.gatekeeper
    }

    pub fn sandboxes(&self) -> &F {
        &self.sandboxes
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingestion
    // ─────────────────────────────────────────────────────────────────────────

    /// Admit an agent from its raw manifest.
    ///
    /// Invalid manifests are errors; manifests that parse but break the
    /// admission rules come back as [`IngestOutcome::Rejected`]. Re-ingesting
    /// an agent replaces its session.
    pub fn ingest(&self, payload: serde_json::Value) -> Result<IngestOutcome> {
        let manifest = self.gatekeeper.load_manifest(payload)?;
        let decision = self.gatekeeper.evaluate_manifest(&manifest);

        let request = match decision.sandbox_request {
            Some(request) if decision.accepted => request,
            _ => {
                tracing::warn!(
                    agent_id = %manifest.agent_id,
                    reasons = ?decision.reasons,
                    "manifest rejected"
                );
                return Ok(IngestOutcome::Rejected {
                    agent_id: manifest.agent_id,
                    reasons: decision.reasons,
                });
            }
        };

        let handle = self.sandboxes.provision(&request)?;
        let session = AgentSession::new(manifest, handle.sandbox_id);

        if self.write_sessions()?.register(session.clone()).is_some() {
            tracing::debug!(agent_id = %session.agent_id, "replaced existing session");
        }
        tracing::info!(
            agent_id = %session.agent_id,
            sandbox_id = %session.sandbox_id,
            "agent admitted"
        );
        Ok(IngestOutcome::Admitted(session))
    }

    /// Parse a manifest, derive its entity, and anchor it.
    ///
    /// The signature and public key are stored opaquely and never checked.
    /// Admission rules are not applied here.
    pub fn anchor_manifest(
        &self,
        payload: serde_json::Value,
        signature: &str,
        public_key: Option<&str>,
    ) -> Result<IntegrityHash> {
        let manifest = self.gatekeeper.load_manifest(payload)?;
        let entity = self.gatekeeper.transform_to_entity(&manifest);
        Ok(self.store.anchor(&entity, signature, public_key)?)
    }

    /// Look up an anchored record and re-verify it.
    pub fn retrieve(&self, handle: &IntegrityHash) -> Result<Option<AnchorRecord>> {
        Ok(self.store.retrieve(handle)?)
    }

    /// Like [`retrieve`](Self::retrieve), taking the handle as hex.
    pub fn retrieve_hex(&self, handle: &str) -> Result<Option<AnchorRecord>> {
        Ok(self.store.retrieve_hex(handle)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the claims of a message from an admitted agent.
    pub fn receive_message(&self, message: &AgentMessage) -> Result<Vec<ClaimVerification>> {
        if !self.write_sessions()?.touch(&message.sender_id) {
            return Err(GatewayError::UnknownSession(message.sender_id.clone()));
        }
        let results = self.citations.verify_message(message);
        tracing::debug!(
            sender_id = %message.sender_id,
            claims = results.len(),
            "verified message claims"
        );
        Ok(results)
    }

    /// Score a window of messages and attach the metrics to the agent's session.
    pub fn record_thrive(
        &self,
        agent_id: &str,
        messages: &[AgentMessage],
        memory_delta: f64,
    ) -> Result<ThriveMetrics> {
        let mut sessions = self.write_sessions()?;
        let session = sessions
            .get_mut(agent_id)
            .ok_or_else(|| GatewayError::UnknownSession(agent_id.to_string()))?;

        let metrics = self.scorer.score(messages, memory_delta);
        session.thrive_metrics = Some(metrics.clone());
        Ok(metrics)
    }

    /// A snapshot of an agent's session.
    pub fn session(&self, agent_id: &str) -> Result<Option<AgentSession>> {
        Ok(self.read_sessions()?.get(agent_id).cloned())
    }

    pub fn session_count(&self) -> Result<usize> {
        Ok(self.read_sessions()?.len())
    }

    fn read_sessions(&self) -> Result<RwLockReadGuard<'_, SessionRegistry>> {
        self.sessions.read().map_err(|_| GatewayError::LockPoisoned)
    }

    fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionRegistry>> {
        self.sessions
            .write()
            .map_err(|_| GatewayError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::Claim;
    use crate::knowledge::{Citation, InMemoryKnowledgeGraph, VerificationStatus};
    use crate::sandbox::InMemorySandboxFactory;
    use serde_json::json;

    type TestGateway = Gateway<InMemoryKnowledgeGraph, InMemorySandboxFactory>;

    fn gateway() -> TestGateway {
        let citation = Citation::new("survey-9", "moon census");
        let graph = InMemoryKnowledgeGraph::new().with_fact("the belt has 3 moons", citation);
        let config = GatewayConfig::default();
        Gateway::in_memory(graph, InMemorySandboxFactory::new(), config)
    }

    fn manifest(agent_id: &str, constraints: serde_json::Value) -> serde_json::Value {
        json!({
            "agent_id": agent_id,
            "intent": {"mission": "explore", "constraints": constraints},
            "capabilities": {"interfaces": ["http"]},
            "memory_state": {"continuity_hash": "abc"}
        })
    }

    #[test]
    fn test_ingest_admits_and_registers() {
        let gw = gateway();
        let outcome = gw.ingest(manifest("a1", json!([]))).unwrap();

        let IngestOutcome::Admitted(session) = outcome else {
            panic!("expected admission");
        };
        assert_eq!(session.sandbox_id, "sandbox-1");
        assert_eq!(gw.session("a1").unwrap().unwrap().sandbox_id, "sandbox-1");
        assert_eq!(gw.sandboxes().requests().unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_rejects_without_side_effects() {
        let gw = gateway();
        let outcome = gw.ingest(manifest("a1", json!(["kernel access"]))).unwrap();

        assert!(!outcome.is_admitted());
        assert_eq!(gw.session_count().unwrap(), 0);
        assert!(gw.sandboxes().requests().unwrap().is_empty());
    }

    #[test]
    fn test_ingest_invalid_manifest_is_error() {
        let gw = gateway();
        let err = gw.ingest(json!({"agent_id": "a1"})).unwrap_err();
        assert!(matches!(err, GatewayError::Manifest(_)));
    }

    #[test]
    fn test_receive_message_requires_session() {
        let gw = gateway();
        let message = AgentMessage::new("ghost", "boo");
        assert!(matches!(
            gw.receive_message(&message),
            Err(GatewayError::UnknownSession(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_receive_message_verifies_claims() {
        let gw = gateway();
        gw.ingest(manifest("a1", json!([]))).unwrap();

        let message = AgentMessage::new("a1", "report")
            .claim(Claim::new("c1", "the belt has 3 moons").cite("survey-9"))
            .claim(Claim::new("c2", "I like it here"));

        let results = gw.receive_message(&message).unwrap();
        assert_eq!(results[0].status, VerificationStatus::Verified);
        assert_eq!(results[1].status, VerificationStatus::Subjective);
    }

    #[test]
    fn test_record_thrive_attaches_metrics() {
        let gw = gateway();
        gw.ingest(manifest("a1", json!([]))).unwrap();

        let metrics = gw
            .record_thrive("a1", &[AgentMessage::new("a1", "one two")], 0.0)
            .unwrap();
        let session = gw.session("a1").unwrap().unwrap();
        assert_eq!(session.thrive_metrics, Some(metrics));

        assert!(gw.record_thrive("ghost", &[], 0.0).is_err());
    }

    #[test]
    fn test_anchor_manifest_round_trip() {
        let gw = gateway();
        let handle = gw
            .anchor_manifest(manifest("a1", json!(["no-kernel"])), "sig", Some("pk"))
            .unwrap();

        let record = gw.retrieve(&handle).unwrap().unwrap();
        assert!(record.is_ok());
        assert_eq!(record.entity().intent.constraints, vec!["no-kernel"]);
        assert_eq!(record.public_key(), Some("pk"));
        assert!(gw.retrieve_hex(&handle.to_hex()).unwrap().is_some());
    }
}
