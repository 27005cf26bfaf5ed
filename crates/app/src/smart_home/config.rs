use std::collections::HashMap;

use voicebridge_domain::entity::EntityId;
use voicebridge_domain::filter::{EntityFilter, is_never_exposed};
use voicebridge_domain::temperature::TemperatureUnit;

use crate::ports::{EntityOverrides, ExposurePolicy};

/// Everything the bridge consults per directive.
///
/// One dispatcher is built per configuration; reconfiguring means building
/// a new [`SmartHome`](super::SmartHome).
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// When `false`, every non-discovery directive fails with
    /// `BRIDGE_UNREACHABLE`.
    pub enabled: bool,
    /// Used as `manufacturerName` and in default descriptions.
    pub product_name: String,
    /// Unit the hub stores climate temperatures in.
    pub temperature_unit: TemperatureUnit,
    pub filter: EntityFilter,
    /// Keyed by entity id.
    pub entity_config: HashMap<String, EntityOverrides>,
}

impl BridgeConfig {
    pub const DEFAULT_PRODUCT_NAME: &'static str = "voicebridge";
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            product_name: Self::DEFAULT_PRODUCT_NAME.to_string(),
            temperature_unit: TemperatureUnit::Celsius,
            filter: EntityFilter::default(),
            entity_config: HashMap::new(),
        }
    }
}

impl ExposurePolicy for BridgeConfig {
    fn should_expose(&self, entity_id: &EntityId) -> bool {
        !is_never_exposed(entity_id) && self.filter.matches(entity_id)
    }

    fn entity_config(&self, entity_id: &EntityId) -> Option<&EntityOverrides> {
        self.entity_config.get(entity_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_everything_when_filter_is_empty() {
        let config = BridgeConfig::default();
        assert!(config.should_expose(&"switch.test".parse().unwrap()));
        assert!(!config.should_expose(&"group.all_locks".parse().unwrap()));
    }

    #[test]
    fn should_return_overrides_by_entity_id() {
        let mut config = BridgeConfig::default();
        config.entity_config.insert(
            "light.test_1".to_string(),
            EntityOverrides {
                name: Some("Config name".to_string()),
                ..EntityOverrides::default()
            },
        );
        let overrides = config.entity_config(&"light.test_1".parse().unwrap()).unwrap();
        assert_eq!(overrides.name.as_deref(), Some("Config name"));
        assert!(config.entity_config(&"light.other".parse().unwrap()).is_none());
    }
}
