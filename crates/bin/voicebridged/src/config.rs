//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `voicebridge.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use voicebridge_app::ports::EntityOverrides;
use voicebridge_app::smart_home::BridgeConfig;
use voicebridge_domain::filter::EntityFilter;
use voicebridge_domain::temperature::{TemperatureUnit, UnknownUnitError};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeSection,
    /// Which entities are published.
    pub filter: EntityFilter,
    /// Per-entity overrides, keyed by entity id.
    pub entity_config: HashMap<String, EntityOverrides>,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Bridge-wide switches.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// When `false`, only discovery is answered.
    pub enabled: bool,
    /// Reported as `manufacturerName`.
    pub product_name: String,
    /// Unit the hub stores climate temperatures in.
    pub temperature_unit: TemperatureUnit,
}

/// Where the hub state comes from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON array of state records; the store starts empty when unset.
    pub states: Option<PathBuf>,
    /// Apply well-known service calls to the seeded state.
    pub effects: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `voicebridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if an
    /// override or the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("voicebridge.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("VOICEBRIDGE_ENABLED") {
            self.bridge.enabled = parse_bool(&val)
                .ok_or_else(|| ConfigError::Validation(format!("invalid VOICEBRIDGE_ENABLED {val:?}")))?;
        }
        if let Some(val) = var("VOICEBRIDGE_PRODUCT_NAME") {
            self.bridge.product_name = val;
        }
        if let Some(val) = var("VOICEBRIDGE_TEMPERATURE_UNIT") {
            self.bridge.temperature_unit = val.parse()?;
        }
        if let Some(val) = var("VOICEBRIDGE_STATES") {
            self.store.states = Some(PathBuf::from(val));
        }
        if let Some(val) = var("VOICEBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.product_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The value threaded into the dispatcher.
    #[must_use]
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            enabled: self.bridge.enabled,
            product_name: self.bridge.product_name.clone(),
            temperature_unit: self.bridge.temperature_unit,
            filter: self.filter.clone(),
            entity_config: self.entity_config.clone(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            enabled: true,
            product_name: BridgeConfig::DEFAULT_PRODUCT_NAME.to_string(),
            temperature_unit: TemperatureUnit::Celsius,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "voicebridged=info,voicebridge_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid temperature unit override")]
    Unit(#[from] UnknownUnitError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert!(config.bridge.enabled);
        assert_eq!(config.bridge.product_name, "voicebridge");
        assert_eq!(config.bridge.temperature_unit, TemperatureUnit::Celsius);
        assert!(config.filter.is_empty());
        assert!(config.store.states.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.bridge.enabled);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [bridge]
            enabled = false
            product_name = "Home"
            temperature_unit = "fahrenheit"

            [filter]
            include_domains = ["light", "switch"]
            exclude_entities = ["light.attic"]

            [entity_config."light.kitchen"]
            name = "Kitchen"
            display_categories = "LIGHT"

            [store]
            states = "states.json"
            effects = true

            [logging]
            filter = "debug"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.bridge.enabled);
        assert_eq!(config.bridge.product_name, "Home");
        assert_eq!(config.bridge.temperature_unit, TemperatureUnit::Fahrenheit);
        assert!(config.filter.include_domains.contains("switch"));
        assert!(config.filter.exclude_entities.contains("light.attic"));
        assert_eq!(
            config.entity_config["light.kitchen"].name.as_deref(),
            Some("Kitchen")
        );
        assert_eq!(config.store.states, Some(PathBuf::from("states.json")));
        assert!(config.store.effects);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert!(config.bridge.enabled);
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("VOICEBRIDGE_ENABLED", "false"),
                ("VOICEBRIDGE_PRODUCT_NAME", "Attic"),
                ("VOICEBRIDGE_TEMPERATURE_UNIT", "K"),
                ("VOICEBRIDGE_STATES", "/tmp/states.json"),
                ("VOICEBRIDGE_LOG", "warn"),
            ]))
            .unwrap();
        assert!(!config.bridge.enabled);
        assert_eq!(config.bridge.product_name, "Attic");
        assert_eq!(config.bridge.temperature_unit, TemperatureUnit::Kelvin);
        assert_eq!(config.store.states, Some(PathBuf::from("/tmp/states.json")));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_voicebridge_log() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("VOICEBRIDGE_LOG", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_invalid_overrides() {
        let mut config = Config::default();
        assert!(matches!(
            config.apply_env_overrides(env(&[("VOICEBRIDGE_ENABLED", "maybe")])),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            config.apply_env_overrides(env(&[("VOICEBRIDGE_TEMPERATURE_UNIT", "rankine")])),
            Err(ConfigError::Unit(_))
        ));
    }

    #[test]
    fn should_reject_empty_product_name() {
        let mut config = Config::default();
        config.bridge.product_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_build_bridge_config() {
        let mut config = Config::default();
        config.bridge.enabled = false;
        config.filter.include_domains.insert("light".to_string());
        let bridge = config.bridge_config();
        assert!(!bridge.enabled);
        assert!(bridge.filter.include_domains.contains("light"));
        assert_eq!(bridge.product_name, "voicebridge");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
