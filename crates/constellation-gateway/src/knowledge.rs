//! Claim verification against a knowledge graph.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Subjective,
    Hallucination,
    Unverified,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Subjective => "subjective",
            Self::Hallucination => "hallucination",
            Self::Unverified => "unverified",
        }
    }
}

/// A source backing a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Citation {
    pub fn new(source_id: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            snippet: snippet.into(),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub citations: Vec<Citation>,
    pub rationale: Option<String>,
}

/// Something that can judge a claim.
pub trait KnowledgeGraph: Send + Sync {
    fn verify_claim(&self, claim: &str) -> VerificationResult;
}

impl<G: KnowledgeGraph + ?Sized> KnowledgeGraph for Arc<G> {
    fn verify_claim(&self, claim: &str) -> VerificationResult {
        (**self).verify_claim(claim)
    }
}

/// Exact-match fact table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeGraph {
    facts: HashMap<String, Citation>,
}

impl InMemoryKnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_fact`](Self::add_fact).
    pub fn with_fact(mut self, claim: impl Into<String>, citation: Citation) -> Self {
        self.add_fact(claim, citation);
        self
    }

    /// Register a claim as known. Replaces any earlier citation for it.
    pub fn add_fact(&mut self, claim: impl Into<String>, citation: Citation) {
        self.facts.insert(claim.into(), citation);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl KnowledgeGraph for InMemoryKnowledgeGraph {
    fn verify_claim(&self, claim: &str) -> VerificationResult {
        match self.facts.get(claim) {
            Some(citation) => VerificationResult {
                status: VerificationStatus::Verified,
                citations: vec![citation.clone()],
                rationale: Some("Claim matched a known fact in the knowledge graph.".into()),
            },
            None => VerificationResult {
                status: VerificationStatus::Unverified,
                citations: Vec::new(),
                rationale: Some("No supporting fact located in the knowledge graph.".into()),
            },
        }
    }
}

/// Verify each claim independently. Duplicate claims collapse to one entry.
pub fn verify_claims<'a, G, I>(graph: &G, claims: I) -> BTreeMap<String, VerificationResult>
where
    G: KnowledgeGraph + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    claims
        .into_iter()
        .map(|claim| (claim.to_string(), graph.verify_claim(claim)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> InMemoryKnowledgeGraph {
        let citation = Citation::new("physics-101", "boiling point").with_uri("kg://physics/1");
        InMemoryKnowledgeGraph::new().with_fact("water boils at 100C at sea level", citation)
    }

    #[test]
    fn test_known_claim_verified() {
        let result = graph().verify_claim("water boils at 100C at sea level");
        assert_eq!(result.status, VerificationStatus::Verified);
        assert_eq!(result.citations.len(), 1);
        assert_eq!(result.citations[0].uri.as_deref(), Some("kg://physics/1"));
    }

    #[test]
    fn test_unknown_claim_unverified() {
        let result = graph().verify_claim("the moon is cheese");
        assert_eq!(result.status, VerificationStatus::Unverified);
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_verify_claims_keys_by_claim() {
        let claims = [
            "water boils at 100C at sea level",
            "the moon is cheese",
            "the moon is cheese",
        ];
        let results = verify_claims(&graph(), claims);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results["the moon is cheese"].status,
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&VerificationStatus::Hallucination).unwrap();
        assert_eq!(json, "\"hallucination\"");
        assert_eq!(VerificationStatus::Subjective.as_str(), "subjective");
    }
}
