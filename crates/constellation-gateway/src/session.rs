//! Sessions for ingested agents.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::manifest::AgentManifest;
use crate::thrive::ThriveMetrics;

/// An admitted agent and the sandbox it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSession {
    pub agent_id: String,
    pub manifest: AgentManifest,
    pub sandbox_id: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub last_seen_at: i64,
    pub thrive_metrics: Option<ThriveMetrics>,
}

impl AgentSession {
    pub fn new(manifest: AgentManifest, sandbox_id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            agent_id: manifest.agent_id.clone(),
            manifest,
            sandbox_id: sandbox_id.into(),
            created_at: now,
            last_seen_at: now,
            thrive_metrics: None,
        }
    }
}

/// Live sessions keyed by agent id.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<String, AgentSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning the one it replaced.
    pub fn register(&mut self, session: AgentSession) -> Option<AgentSession> {
        self.sessions.insert(session.agent_id.clone(), session)
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentSession> {
        self.sessions.get(agent_id)
    }

    pub fn get_mut(&mut self, agent_id: &str) -> Option<&mut AgentSession> {
        self.sessions.get_mut(agent_id)
    }

    /// Update `last_seen_at`. Returns false for unknown agents.
    pub fn touch(&mut self, agent_id: &str) -> bool {
        match self.sessions.get_mut(agent_id) {
            Some(session) => {
                session.last_seen_at = now_millis().max(session.last_seen_at);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, agent_id: &str) -> Option<AgentSession> {
        self.sessions.remove(agent_id)
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Current time in milliseconds. A clock set before the epoch reads as 0.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
