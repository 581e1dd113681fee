//! Per-claim verification of agent-to-agent messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::knowledge::{KnowledgeGraph, VerificationStatus};

/// A factual statement inside a message, with the sources the sender cites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

impl Claim {
    pub fn new(claim_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            claim_id: claim_id.into(),
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn cite(mut self, source: impl Into<String>) -> Self {
        self.citations.push(source.into());
        self
    }
}

/// A message sent by an ingested agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl AgentMessage {
    pub fn new(sender_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            content: content.into(),
            claims: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }
}

/// Outcome for one claim of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerification {
    pub claim_id: String,
    pub status: VerificationStatus,
    /// Source ids of the citations the graph matched.
    pub evidence: Vec<String>,
    pub notes: Option<String>,
}

/// Checks message claims against a knowledge graph.
pub struct CitationEngine<K> {
    graph: K,
}

impl<K: KnowledgeGraph> CitationEngine<K> {
    pub fn new(graph: K) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &K {
        &self.graph
    }

    /// One verification per claim, in message order.
    ///
    /// Uncited claims are marked subjective without consulting the graph.
    pub fn verify_message(&self, message: &AgentMessage) -> Vec<ClaimVerification> {
        message
            .claims
            .iter()
            .map(|claim| {
                if claim.citations.is_empty() {
                    return ClaimVerification {
                        claim_id: claim.claim_id.clone(),
                        status: VerificationStatus::Subjective,
                        evidence: Vec::new(),
                        notes: Some("No citations provided; flagged as subjective.".into()),
                    };
                }
                let result = self.graph.verify_claim(&claim.text);
                ClaimVerification {
                    claim_id: claim.claim_id.clone(),
                    status: result.status,
                    evidence: result.citations.into_iter().map(|c| c.source_id).collect(),
                    notes: result.rationale,
                }
            })
            .collect()
    }
}
