//! Thrive metrics: a rough signal of how an agent is doing over a window of
//! messages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::citation::AgentMessage;
use crate::session::now_millis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThriveWeights {
    pub complexity_weight: f64,
    pub novelty_weight: f64,
    pub continuity_weight: f64,
}

impl Default for ThriveWeights {
    fn default() -> Self {
        Self {
            complexity_weight: 0.4,
            novelty_weight: 0.35,
            continuity_weight: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThriveMetrics {
    pub complexity_of_thought: f64,
    pub novelty_of_output: f64,
    pub continuity_of_self: f64,
    /// Only set when supplied by the caller; the scorer does not compute it.
    pub empathy_index: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub computed_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ThriveScorer {
    weights: ThriveWeights,
}

impl ThriveScorer {
    pub fn new(weights: ThriveWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ThriveWeights {
        &self.weights
    }

    /// Score a window of messages.
    ///
    /// Tokens are the whitespace-separated words of every message's content.
    /// `memory_delta` measures how far the agent's memory drifted; zero
    /// means perfect continuity.
    pub fn score<'a, I>(&self, messages: I, memory_delta: f64) -> ThriveMetrics
    where
        I: IntoIterator<Item = &'a AgentMessage>,
    {
        let mut total = 0usize;
        let mut unique = HashSet::new();
        for message in messages {
            for token in message.content.split_whitespace() {
                total += 1;
                unique.insert(token);
            }
        }
        let token_count = total.max(1) as f64;

        let complexity = (token_count + 1.0).log2();
        let novelty = unique.len() as f64 / token_count;
        let continuity = (1.0 - memory_delta.abs()).max(0.0);

        ThriveMetrics {
            complexity_of_thought: complexity * self.weights.complexity_weight,
            novelty_of_output: novelty * self.weights.novelty_weight,
            continuity_of_self: continuity * self.weights.continuity_weight,
            empathy_index: None,
            computed_at: now_millis(),
        }
    }
}
