//! Sandbox provisioning for admitted agents.
//!
//! The gateway never runs agent code itself. It hands a [`SandboxRequest`]
//! to a [`SandboxFactory`] and records the returned [`SandboxHandle`] on the
//! agent's session.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource and isolation limits for an agent sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    pub runtime: String,
    pub network_access: bool,
    pub filesystem_write: bool,
    pub max_cpu_seconds: u64,
    pub max_memory_mb: u64,
    pub allowed_syscalls: Vec<String>,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            runtime: "docker".into(),
            network_access: false,
            filesystem_write: false,
            max_cpu_seconds: 60,
            max_memory_mb: 256,
            allowed_syscalls: Vec::new(),
        }
    }
}

/// A request to provision a sandbox for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxRequest {
    pub agent_id: String,
    /// Container image. Not derived from the manifest yet.
    pub image: Option<String>,
    pub policy: SandboxPolicy,
    pub entrypoint: Option<String>,
    pub env: BTreeMap<String, String>,
}

impl SandboxRequest {
    /// A request with no image, entrypoint, or environment.
    pub fn new(agent_id: impl Into<String>, policy: SandboxPolicy) -> Self {
        Self {
            agent_id: agent_id.into(),
            image: None,
            policy,
            entrypoint: None,
            env: BTreeMap::new(),
        }
    }
}

/// Identifies a provisioned sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SandboxHandle {
    pub sandbox_id: String,
    pub agent_id: String,
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("provisioning failed for {agent_id}: {reason}")]
    ProvisionFailed { agent_id: String, reason: String },

    #[error("sandbox factory lock poisoned")]
    LockPoisoned,
}

/// Provisions sandboxes. Implementations must be shareable across threads.
pub trait SandboxFactory: Send + Sync {
    fn provision(&self, request: &SandboxRequest) -> Result<SandboxHandle, SandboxError>;
}

/// Factory that only hands out sequential ids and keeps every request.
#[derive(Debug, Default)]
pub struct InMemorySandboxFactory {
    next_id: AtomicU64,
    requests: Mutex<Vec<SandboxRequest>>,
}

impl InMemorySandboxFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request provisioned so far, in order.
    pub fn requests(&self) -> Result<Vec<SandboxRequest>, SandboxError> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .map_err(|_| SandboxError::LockPoisoned)
    }
}

impl SandboxFactory for InMemorySandboxFactory {
    fn provision(&self, request: &SandboxRequest) -> Result<SandboxHandle, SandboxError> {
        let mut requests = self.requests.lock().map_err(|_| SandboxError::LockPoisoned)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        requests.push(request.clone());
        Ok(SandboxHandle {
            sandbox_id: format!("sandbox-{n}"),
            agent_id: request.agent_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = SandboxPolicy::default();
        assert_eq!(policy.runtime, "docker");
        assert!(!policy.network_access);
        assert!(!policy.filesystem_write);
        assert_eq!(policy.max_cpu_seconds, 60);
        assert_eq!(policy.max_memory_mb, 256);
        assert!(policy.allowed_syscalls.is_empty());
    }

    #[test]
    fn test_sequential_ids() {
        let factory = InMemorySandboxFactory::new();
        let a = factory
            .provision(&SandboxRequest::new("a1", SandboxPolicy::default()))
            .unwrap();
        let b = factory
            .provision(&SandboxRequest::new("a2", SandboxPolicy::default()))
            .unwrap();

        assert_eq!(a.sandbox_id, "sandbox-1");
        assert_eq!(b.sandbox_id, "sandbox-2");
        assert_eq!(b.agent_id, "a2");

        let requests = factory.requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].agent_id, "a1");
    }
}
