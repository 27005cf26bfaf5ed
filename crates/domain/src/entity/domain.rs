//! Entity domains the bridge knows how to translate.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// The domain half of an entity id, restricted to the domains the bridge
/// can expose. Anything else fails to parse and is never discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityDomain {
    AlarmControlPanel,
    Alert,
    Automation,
    BinarySensor,
    Climate,
    Cover,
    Fan,
    Group,
    InputBoolean,
    Light,
    Lock,
    MediaPlayer,
    Scene,
    Script,
    Sensor,
    Switch,
}

impl EntityDomain {
    pub const ALL: [Self; 16] = [
        Self::AlarmControlPanel,
        Self::Alert,
        Self::Automation,
        Self::BinarySensor,
        Self::Climate,
        Self::Cover,
        Self::Fan,
        Self::Group,
        Self::InputBoolean,
        Self::Light,
        Self::Lock,
        Self::MediaPlayer,
        Self::Scene,
        Self::Script,
        Self::Sensor,
        Self::Switch,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlarmControlPanel => "alarm_control_panel",
            Self::Alert => "alert",
            Self::Automation => "automation",
            Self::BinarySensor => "binary_sensor",
            Self::Climate => "climate",
            Self::Cover => "cover",
            Self::Fan => "fan",
            Self::Group => "group",
            Self::InputBoolean => "input_boolean",
            Self::Light => "light",
            Self::Lock => "lock",
            Self::MediaPlayer => "media_player",
            Self::Scene => "scene",
            Self::Script => "script",
            Self::Sensor => "sensor",
            Self::Switch => "switch",
        }
    }
}

impl FromStr for EntityDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedDomain(s.to_string()))
    }
}

impl fmt::Display for EntityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
