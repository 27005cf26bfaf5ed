//! Exposure port: which entities become endpoints, and how they are named.

use serde::Deserialize;

use voicebridge_domain::entity::EntityId;

/// Per-entity presentation overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntityOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    /// A single display category, e.g. `SWITCH`.
    pub display_categories: Option<String>,
}

/// Decides which hub entities the bridge publishes.
///
/// The fixed never-expose list is applied by the bridge on top of this
/// policy, so implementations cannot override it.
pub trait ExposurePolicy {
    fn should_expose(&self, entity_id: &EntityId) -> bool;

    fn entity_config(&self, entity_id: &EntityId) -> Option<&EntityOverrides>;
}
