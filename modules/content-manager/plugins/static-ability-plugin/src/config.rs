//! Configuration for the static ability plugin.

use content_manager_sdk::AbilityGrant;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAbilityPluginConfig {
    /// Grants given to every caller. Nothing is allowed when empty.
    pub grants: Vec<AbilityGrant>,
}
