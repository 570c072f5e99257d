use serde::{Deserialize, Serialize};

/// Configuration for the rights layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RightsConfig {
    /// When `true`, every check passes without consulting the object's
    /// owner or access records. Useful for single-user local deployments.
    pub permissive: bool,
}

impl RightsConfig {
    /// A configuration that allows everything.
    pub fn permissive() -> Self {
        Self { permissive: true }
    }
}
