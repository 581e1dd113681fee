//! Gateway configuration.

use serde::{Deserialize, Serialize};

use constellation_store::StoreConfig;

use crate::error::{GatewayError, Result};
use crate::sandbox::SandboxPolicy;
use crate::thrive::ThriveWeights;

/// Configuration for the Gateway.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use constellation_gateway::GatewayConfig;
///
/// let config = GatewayConfig::from_json_str(r#"{"store": {"scope": "v1"}}"#).unwrap();
/// assert_eq!(config.sandbox_policy.max_memory_mb, 256);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Store configuration (integrity scope).
    pub store: StoreConfig,
    /// Policy attached to every admitted agent's sandbox request.
    pub sandbox_policy: SandboxPolicy,
    /// Weights applied by the thrive scorer.
    pub thrive_weights: ThriveWeights,
}

impl GatewayConfig {
    /// Load a config from JSON text; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(GatewayError::Config)
    }
}
