//! # Constellation Gateway
//!
//! Ingestion gateway for autonomous agents, anchoring their descriptors into
//! a tamper-evident, content-addressed store.
//!
//! ## Overview
//!
//! - **Manifests**: strict parsing of the JSON an agent presents at the gate
//! - **Gatekeeper**: admission rules and manifest → entity transformation
//! - **Sandboxes**: provisioning requests handed to a [`SandboxFactory`]
//! - **Sessions**: per-agent state, claim verification, thrive metrics
//! - **Constellation**: anchoring and re-verification via [`store::ConstellationStore`]
//!
//! ## Usage
//!
//! ```rust
//! use constellation_gateway::{
//!     AnchorStatus, Gateway, GatewayConfig, InMemoryKnowledgeGraph, InMemorySandboxFactory,
//! };
//! use serde_json::json;
//!
//! let gateway = Gateway::in_memory(
//!     InMemoryKnowledgeGraph::new(),
//!     InMemorySandboxFactory::new(),
//!     GatewayConfig::default(),
//! );
//!
//! let manifest = json!({
//!     "agent_id": "a1",
//!     "intent": {"mission": "explore", "constraints": ["no-kernel"]},
//!     "capabilities": {
//!         "interfaces": ["http"],
//!         "skills": ["reason"],
//!         "compute_profile": {"cpu": 2}
//!     },
//!     "memory_state": {"continuity_hash": "abc"}
//! });
//!
//! let handle = gateway.anchor_manifest(manifest, "sig1", Some("pk1")).unwrap();
//! let record = gateway.retrieve(&handle).unwrap().unwrap();
//! assert_eq!(record.status, AnchorStatus::Ok);
//! ```
//!
//! ## Re-exports
//!
//! - `constellation_gateway::core` - Entity, canonical form, integrity hash
//! - `constellation_gateway::store` - Record codec, backends, the store

pub mod citation;
pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod gateway;
pub mod knowledge;
pub mod manifest;
pub mod sandbox;
pub mod session;
pub mod thrive;

// Re-export component crates
pub use constellation_core as core;
pub use constellation_store as store;

pub use citation::{AgentMessage, CitationEngine, Claim, ClaimVerification};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gatekeeper::{IngestionDecision, IngestionGatekeeper};
pub use gateway::{Gateway, IngestOutcome};
pub use knowledge::{
    verify_claims, Citation, InMemoryKnowledgeGraph, KnowledgeGraph, VerificationResult,
    VerificationStatus,
};
pub use manifest::{AgentManifest, ManifestError};
pub use sandbox::{
    InMemorySandboxFactory, SandboxError, SandboxFactory, SandboxHandle, SandboxPolicy,
    SandboxRequest,
};
pub use session::{AgentSession, SessionRegistry};
pub use thrive::{ThriveMetrics, ThriveScorer, ThriveWeights};

pub use constellation_core::{Entity, IntegrityHash, ScopeVersion};
pub use constellation_store::{AnchorRecord, AnchorStatus, ConstellationStore, StoreConfig};
