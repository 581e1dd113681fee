//! Agent manifests: the JSON document an agent presents at the gate.
//!
//! Parsing is strict. Unknown keys are rejected at every level, required
//! fields must be present, and the few fields that must carry content
//! (`agent_id`, `intent.mission`, `memory_state.continuity_hash`) must be
//! non-empty. Optional lists and maps default to empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use constellation_core::{AttrMap, AttrValue};

/// Keys allowed in `capabilities.compute_profile`.
pub const COMPUTE_PROFILE_KEYS: [&str; 3] = ["cpu", "memory_gb", "accelerators"];

/// Errors from manifest parsing.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Not valid JSON, a missing field, an unknown field, or a wrong type.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is required and cannot be empty")]
    EmptyField(&'static str),

    #[error("invalid compute_profile: {0}")]
    InvalidComputeProfile(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentIntent {
    pub mission: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentCapabilities {
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub compute_profile: AttrMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryState {
    pub continuity_hash: String,
    #[serde(default)]
    pub summaries: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestations: Option<Vec<String>>,
}

impl TrustClaims {
    /// The claims as an entity trust block, keeping only keys that were given.
    pub fn to_attr_map(&self) -> AttrMap {
        let mut map = AttrMap::new();
        if let Some(provenance) = &self.provenance {
            map.insert("provenance".into(), provenance.clone().into());
        }
        if let Some(attestations) = &self.attestations {
            map.insert("attestations".into(), attestations.clone().into());
        }
        map
    }
}

/// A validated agent manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentManifest {
    pub agent_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub intent: AgentIntent,
    pub capabilities: AgentCapabilities,
    pub memory_state: MemoryState,
    #[serde(default)]
    pub trust: TrustClaims,
}

impl AgentManifest {
    /// Parse and validate a manifest from a JSON value.
    pub fn from_value(payload: serde_json::Value) -> Result<Self, ManifestError> {
        let manifest: AgentManifest = serde_json::from_value(payload)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate a manifest from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, ManifestError> {
        let manifest: AgentManifest = serde_json::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.agent_id.is_empty() {
            return Err(ManifestError::EmptyField("agent_id"));
        }
        if self.intent.mission.is_empty() {
            return Err(ManifestError::EmptyField("intent.mission"));
        }
        if self.memory_state.continuity_hash.is_empty() {
            return Err(ManifestError::EmptyField("memory_state.continuity_hash"));
        }
        validate_compute_profile(&self.capabilities.compute_profile)
    }
}

fn validate_compute_profile(profile: &AttrMap) -> Result<(), ManifestError> {
    for (key, value) in profile {
        match key.as_str() {
            "cpu" | "memory_gb" => match value.as_f64() {
                Some(n) if n >= 0.0 => {}
                Some(_) => {
                    return Err(ManifestError::InvalidComputeProfile(format!(
                        "{key} must be >= 0"
                    )))
                }
                None => {
                    return Err(ManifestError::InvalidComputeProfile(format!(
                        "{key} must be a number"
                    )))
                }
            },
            "accelerators" => {
                let all_text = match value.as_list() {
                    Some(items) => items.iter().all(|i| matches!(i, AttrValue::Text(_))),
                    None => false,
                };
                if !all_text {
                    return Err(ManifestError::InvalidComputeProfile(
                        "accelerators must be a list of text".into(),
                    ));
                }
            }
            other => {
                return Err(ManifestError::InvalidComputeProfile(format!(
                    "unknown key `{other}` (allowed: {})",
                    COMPUTE_PROFILE_KEYS.join(", ")
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "agent_id": "a1",
            "intent": {"mission": "explore", "constraints": ["no-network"]},
            "capabilities": {
                "interfaces": ["http"],
                "skills": ["reason"],
                "compute_profile": {"cpu": 2, "memory_gb": 1.5, "accelerators": ["gpu"]}
            },
            "memory_state": {"continuity_hash": "abc"},
            "trust": {"provenance": ["registry"]}
        })
    }

    #[test]
    fn test_parse_valid_manifest() {
        let m = AgentManifest::from_value(valid()).unwrap();
        assert_eq!(m.agent_id, "a1");
        assert_eq!(m.display_name, None);
        assert_eq!(m.intent.constraints, vec!["no-network"]);
        assert_eq!(m.capabilities.compute_profile["cpu"], AttrValue::Integer(2));
        assert_eq!(
            m.capabilities.compute_profile["memory_gb"],
            AttrValue::Float(1.5)
        );
        assert!(m.memory_state.summaries.is_empty());
        assert_eq!(m.trust.provenance, Some(vec!["registry".to_string()]));
        assert_eq!(m.trust.attestations, None);
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let mut payload = valid();
        payload["memory_state"] = json!({});
        let err = AgentManifest::from_value(payload).unwrap_err();
        assert!(err.to_string().contains("continuity_hash"), "{err}");
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut payload = valid();
        payload["agent_id"] = json!("");
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::EmptyField("agent_id"))
        ));

        let mut payload = valid();
        payload["intent"]["mission"] = json!("");
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::EmptyField("intent.mission"))
        ));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let mut payload = valid();
        payload["intent"]["interfaces"] = json!(["http"]);
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::Json(_))
        ));

        let mut payload = valid();
        payload["sandbox_preferences"] = json!({"runtime": "wasm"});
        assert!(AgentManifest::from_value(payload).is_err());
    }

    #[test]
    fn test_compute_profile_rules() {
        let mut payload = valid();
        payload["capabilities"]["compute_profile"] = json!({"cpu": -1});
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::InvalidComputeProfile(_))
        ));

        let mut payload = valid();
        payload["capabilities"]["compute_profile"] = json!({"gpu_count": 1});
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::InvalidComputeProfile(_))
        ));

        let mut payload = valid();
        payload["capabilities"]["compute_profile"] = json!({"accelerators": [1]});
        assert!(matches!(
            AgentManifest::from_value(payload),
            Err(ManifestError::InvalidComputeProfile(_))
        ));
    }

    #[test]
    fn test_from_json_str() {
        let m = AgentManifest::from_json_str(&valid().to_string()).unwrap();
        assert_eq!(m.intent.mission, "explore");
        assert!(AgentManifest::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_trust_to_attr_map_keeps_given_keys() {
        let m = AgentManifest::from_value(valid()).unwrap();
        let trust = m.trust.to_attr_map();
        assert_eq!(trust.len(), 1);
        assert!(trust.contains_key("provenance"));
    }
}
