//! Endpoint identity and presentation.

use std::fmt;

use voicebridge_domain::entity::EntityId;
use voicebridge_domain::entity::view::{DomainState, EntityView};
use voicebridge_domain::entity::EntityDomain;
use voicebridge_domain::error::ValidationError;

const SEPARATOR: char = '#';

/// Characters the voice service rejects in names and descriptions.
const FORBIDDEN_NAME_CHARS: &[char] = &[
    '}', '{', '\\', '/', '|', '"', '(', ')', '[', ']', '+', '~', '!', '>', '<', '*', '%',
];

/// `light.kitchen` → `light#kitchen`.
#[must_use]
pub fn endpoint_id(entity_id: &EntityId) -> String {
    format!("{}{SEPARATOR}{}", entity_id.domain(), entity_id.object_id())
}

/// Inverse of [`endpoint_id`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEntityId`] when the decoded value is
/// not a valid entity id.
pub fn entity_id_from_endpoint(endpoint_id: &str) -> Result<EntityId, ValidationError> {
    endpoint_id.replacen(SEPARATOR, ".", 1).parse()
}

/// Strip characters the voice service does not accept.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_NAME_CHARS.contains(c))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    ActivityTrigger,
    ContactSensor,
    Door,
    Doorbell,
    Fan,
    Light,
    MotionSensor,
    Other,
    SceneTrigger,
    SecurityPanel,
    SmartLock,
    Switch,
    TemperatureSensor,
    Thermostat,
    Tv,
}

impl DisplayCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActivityTrigger => "ACTIVITY_TRIGGER",
            Self::ContactSensor => "CONTACT_SENSOR",
            Self::Door => "DOOR",
            Self::Doorbell => "DOORBELL",
            Self::Fan => "FAN",
            Self::Light => "LIGHT",
            Self::MotionSensor => "MOTION_SENSOR",
            Self::Other => "OTHER",
            Self::SceneTrigger => "SCENE_TRIGGER",
            Self::SecurityPanel => "SECURITY_PANEL",
            Self::SmartLock => "SMARTLOCK",
            Self::Switch => "SWITCH",
            Self::TemperatureSensor => "TEMPERATURE_SENSOR",
            Self::Thermostat => "THERMOSTAT",
            Self::Tv => "TV",
        }
    }

    /// Primary category derived from the entity's domain.
    #[must_use]
    pub fn for_entity(view: &EntityView) -> Self {
        match (view.domain, &view.state) {
            (EntityDomain::Switch, _) => Self::Switch,
            (EntityDomain::Light, _) => Self::Light,
            (EntityDomain::Fan, _) => Self::Fan,
            (EntityDomain::Cover, _) => Self::Door,
            (EntityDomain::Lock, _) => Self::SmartLock,
            (EntityDomain::Climate, _) => Self::Thermostat,
            (EntityDomain::MediaPlayer, _) => Self::Tv,
            (EntityDomain::Script, _) => Self::ActivityTrigger,
            (EntityDomain::Scene, _) => Self::SceneTrigger,
            (EntityDomain::AlarmControlPanel, _) => Self::SecurityPanel,
            (EntityDomain::BinarySensor, DomainState::BinarySensor(sensor)) => {
                match sensor.device_class.as_deref() {
                    Some("door" | "garage_door" | "opening" | "window") => Self::ContactSensor,
                    Some("motion") => Self::MotionSensor,
                    Some("occupancy") => Self::Doorbell,
                    _ => Self::Other,
                }
            }
            (EntityDomain::Sensor, DomainState::Sensor(sensor))
                if sensor.temperature_unit().is_some() =>
            {
                Self::TemperatureSensor
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DisplayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
