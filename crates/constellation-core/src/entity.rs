//! Entity: the logical subject anchored in the Constellation.
//!
//! An entity is built by the caller (usually from a validated manifest) and
//! is treated as immutable once anchored. Only the intent, capabilities and
//! memory blocks are covered by the integrity hash; the identifier, display
//! name, mass, gravity and trust block are carried along but excluded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// A free-form attribute value (compute profile entries, trust entries).
///
/// Integers and floats are kept apart so that `2` and `2.0` canonicalize
/// (and therefore hash) differently, exactly as they were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
}

/// String-keyed attribute mapping. Key order is irrelevant by construction.
pub type AttrMap = BTreeMap<String, AttrValue>;

impl AttrValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// List view of the value, if it is a list.
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a JSON value for canonicalization.
    ///
    /// `path` is only used to name the offending field on failure.
    pub fn to_json(&self, path: &str) -> Result<serde_json::Value> {
        Ok(match self {
            AttrValue::Bool(b) => serde_json::Value::Bool(*b),
            AttrValue::Integer(i) => serde_json::Value::from(*i),
            AttrValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| CoreError::NonFiniteNumber(path.to_string()))?,
            AttrValue::Text(s) => serde_json::Value::String(s.clone()),
            AttrValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json(path))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Integer(v.into())
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Integer(v.into())
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        AttrValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// What the agent is for, and what it promises not to do.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentBlock {
    pub mission: String,
    /// Order is significant.
    pub constraints: Vec<String>,
}

/// What the agent can do and what it runs on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapabilitiesBlock {
    pub interfaces: Vec<String>,
    pub skills: Vec<String>,
    pub compute_profile: AttrMap,
}

/// The agent's continuity state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryBlock {
    /// Opaque token; never interpreted.
    pub continuity_hash: String,
    pub summaries: Vec<String>,
    pub attachments: Vec<String>,
}

/// The anchored subject (an agent's derived descriptor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Externally assigned; unique per logical subject, not per hash.
    pub id: String,
    pub display_name: String,
    pub mass: f64,
    pub gravity: f64,
    pub intent: IntentBlock,
    pub capabilities: CapabilitiesBlock,
    pub memory: MemoryBlock,
    pub trust: AttrMap,
}

impl Entity {
    /// Start building an entity with its required fields.
    pub fn builder(
        id: impl Into<String>,
        mission: impl Into<String>,
        continuity_hash: impl Into<String>,
    ) -> EntityBuilder {
        EntityBuilder::new(id, mission, continuity_hash)
    }
}

/// Builder for constructing entities.
///
/// Defaults: display name = id, mass = 1.0, gravity = 0.5, everything else empty.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    /// Create a new builder.
    pub fn new(
        id: impl Into<String>,
        mission: impl Into<String>,
        continuity_hash: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            entity: Entity {
                display_name: id.clone(),
                id,
                mass: 1.0,
                gravity: 0.5,
                intent: IntentBlock {
                    mission: mission.into(),
                    constraints: Vec::new(),
                },
                capabilities: CapabilitiesBlock::default(),
                memory: MemoryBlock {
                    continuity_hash: continuity_hash.into(),
                    ..MemoryBlock::default()
                },
                trust: AttrMap::new(),
            },
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.entity.display_name = name.into();
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.entity.mass = mass;
        self
    }

    pub fn gravity(mut self, gravity: f64) -> Self {
        self.entity.gravity = gravity;
        self
    }

    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.entity.intent.constraints.push(constraint.into());
        self
    }

    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.entity.capabilities.interfaces.push(interface.into());
        self
    }

    pub fn skill(mut self, skill: impl Into<String>) -> Self {
        self.entity.capabilities.skills.push(skill.into());
        self
    }

    /// Set a compute profile entry (replaces any previous value for `key`).
    pub fn compute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entity
            .capabilities
            .compute_profile
            .insert(key.into(), value.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.entity.memory.summaries.push(summary.into());
        self
    }

    pub fn attachment(mut self, attachment: impl Into<String>) -> Self {
        self.entity.memory.attachments.push(attachment.into());
        self
    }

    /// Set a trust entry (replaces any previous value for `key`).
    pub fn trust(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entity.trust.insert(key.into(), value.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let entity = Entity::builder("a1", "explore", "abc").build();
        assert_eq!(entity.display_name, "a1");
        assert_eq!(entity.mass, 1.0);
        assert_eq!(entity.gravity, 0.5);
        assert!(entity.intent.constraints.is_empty());
        assert!(entity.capabilities.compute_profile.is_empty());
        assert!(entity.trust.is_empty());
    }

    #[test]
    fn test_builder_preserves_list_order() {
        let entity = Entity::builder("a1", "explore", "abc")
            .constraint("second")
            .constraint("first")
            .summary("z")
            .summary("a")
            .build();
        assert_eq!(entity.intent.constraints, vec!["second", "first"]);
        assert_eq!(entity.memory.summaries, vec!["z", "a"]);
    }

    #[test]
    fn test_attr_value_json_keeps_number_kind() {
        assert_eq!(AttrValue::from(2).to_json("cpu").unwrap().to_string(), "2");
        assert_eq!(
            AttrValue::from(2.0).to_json("cpu").unwrap().to_string(),
            "2.0"
        );
    }

    #[test]
    fn test_attr_value_rejects_non_finite() {
        let err = AttrValue::Float(f64::NAN).to_json("memory_gb").unwrap_err();
        assert!(matches!(err, CoreError::NonFiniteNumber(path) if path == "memory_gb"));
    }

    #[test]
    fn test_attr_value_untagged_deserialize() {
        let v: AttrValue = serde_json::from_str("[1, 1.5, \"gpu\", true]").unwrap();
        assert_eq!(
            v,
            AttrValue::List(vec![
                AttrValue::Integer(1),
                AttrValue::Float(1.5),
                AttrValue::Text("gpu".into()),
                AttrValue::Bool(true),
            ])
        );
    }
}
