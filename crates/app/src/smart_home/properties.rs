//! Property mapper: hub state → reported property values.

use serde_json::{Map, Value, json};

use voicebridge_domain::color::mired_to_kelvin;
use voicebridge_domain::entity::state;
use voicebridge_domain::entity::view::{ClimateState, DomainState, EntityView};
use voicebridge_domain::temperature::TemperatureUnit;

use super::capabilities::{Capability, Interface};

/// One reported property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub namespace: &'static str,
    pub name: &'static str,
    pub instance: Option<&'static str>,
    pub value: Value,
}

impl Property {
    pub fn new(interface: Interface, name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            namespace: interface.namespace(),
            name,
            instance: None,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: Option<&'static str>) -> Self {
        self.instance = instance;
        self
    }

    /// `context.properties` entry.
    #[must_use]
    pub fn to_json(&self, time_of_sample: &str) -> Value {
        let mut property = Map::new();
        property.insert("namespace".to_string(), json!(self.namespace));
        property.insert("name".to_string(), json!(self.name));
        if let Some(instance) = self.instance {
            property.insert("instance".to_string(), json!(instance));
        }
        property.insert("value".to_string(), self.value.clone());
        property.insert("timeOfSample".to_string(), json!(time_of_sample));
        property.insert("uncertaintyInMilliseconds".to_string(), json!(0));
        Value::Object(property)
    }
}

/// Round to the nearest whole number.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn whole(value: f64) -> i64 {
    value.round() as i64
}

pub(crate) fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

pub(crate) fn scale(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "CELSIUS",
        TemperatureUnit::Fahrenheit => "FAHRENHEIT",
        TemperatureUnit::Kelvin => "KELVIN",
    }
}

pub(crate) fn unit_from_scale(scale: &str) -> Option<TemperatureUnit> {
    match scale {
        "CELSIUS" => Some(TemperatureUnit::Celsius),
        "FAHRENHEIT" => Some(TemperatureUnit::Fahrenheit),
        "KELVIN" => Some(TemperatureUnit::Kelvin),
        _ => None,
    }
}

/// `{"value", "scale"}`
pub(crate) fn temperature(value: f64, unit: TemperatureUnit) -> Value {
    json!({"value": value, "scale": scale(unit)})
}

/// Hub HVAC mode → thermostat mode, first match wins when setting a mode.
const THERMOSTAT_MODE_MAP: [(&str, &str); 7] = [
    ("heat", "HEAT"),
    ("cool", "COOL"),
    ("heat_cool", "AUTO"),
    ("auto", "AUTO"),
    ("off", "OFF"),
    ("fan_only", "OFF"),
    ("dry", "CUSTOM"),
];

pub(crate) const THERMOSTAT_MODE_ECO: &str = "ECO";
pub(crate) const PRESET_ECO: &str = "eco";

pub(crate) fn thermostat_mode(hvac_mode: &str) -> Option<&'static str> {
    THERMOSTAT_MODE_MAP
        .iter()
        .find(|(hub, _)| *hub == hvac_mode)
        .map(|(_, mode)| *mode)
}

/// Hub HVAC modes that map onto `mode`, in preference order.
pub(crate) fn hvac_modes_for(mode: &str) -> impl Iterator<Item = &'static str> + '_ {
    THERMOSTAT_MODE_MAP
        .iter()
        .filter(move |(_, candidate)| *candidate == mode)
        .map(|(hub, _)| *hub)
}

/// Thermostat modes the entity can be put in.
pub(crate) fn thermostat_modes(climate: &ClimateState) -> Vec<&'static str> {
    let mut modes: Vec<&'static str> = Vec::new();
    for mode in climate.hvac_modes.iter().filter_map(|hub| thermostat_mode(hub)) {
        if !modes.contains(&mode) {
            modes.push(mode);
        }
    }
    if climate.preset_modes.iter().any(|preset| preset == PRESET_ECO) {
        modes.push(THERMOSTAT_MODE_ECO);
    }
    modes
}

pub(crate) fn arm_state(alarm_state: &str) -> Option<&'static str> {
    match alarm_state {
        state::ALARM_DISARMED => Some("DISARMED"),
        state::ALARM_ARMED_AWAY => Some("ARMED_AWAY"),
        state::ALARM_ARMED_HOME | state::ALARM_ARMED_CUSTOM_BYPASS => Some("ARMED_STAY"),
        state::ALARM_ARMED_NIGHT => Some("ARMED_NIGHT"),
        _ => None,
    }
}

fn is_on(state: &DomainState) -> Option<bool> {
    match state {
        DomainState::OnOff(switch) => Some(switch.on),
        DomainState::Light(light) => Some(light.on),
        DomainState::Fan(fan) => Some(fan.on),
        DomainState::Cover(cover) => Some(!cover.closed),
        DomainState::Climate(climate) => Some(climate.hvac_mode != state::OFF),
        DomainState::MediaPlayer(player) => Some(player.is_on()),
        _ => None,
    }
}

/// Current value of one property, `None` when the hub state does not carry it.
#[must_use]
pub fn read_property(
    view: &EntityView,
    interface: Interface,
    name: &str,
    hub_unit: TemperatureUnit,
) -> Option<Value> {
    use DomainState as S;
    use Interface as I;

    match (interface, name, &view.state) {
        (I::EndpointHealth, "connectivity", _) => Some(json!({
            "value": if view.available { "OK" } else { "UNREACHABLE" }
        })),
        (I::PowerController, "powerState", state) => is_on(state).map(|on| json!(on_off(on))),
        (I::BrightnessController, "brightness", S::Light(light)) => light
            .brightness
            .map(|brightness| json!(whole(brightness / 255.0 * 100.0))),
        (I::ColorController, "color", S::Light(light)) => light.hs_color.map(|(hue, saturation)| {
            json!({
                "hue": hue,
                "saturation": saturation / 100.0,
                "brightness": light.brightness.unwrap_or(255.0) / 255.0,
            })
        }),
        (I::ColorTemperatureController, "colorTemperatureInKelvin", S::Light(light)) => light
            .color_temp
            .map(|mireds| json!(whole(mired_to_kelvin(mireds)))),
        (I::PercentageController, "percentage", S::Fan(fan))
        | (I::PowerLevelController, "powerLevel", S::Fan(fan)) => Some(json!(fan.percentage())),
        (I::PercentageController, "percentage", S::Cover(cover)) => {
            cover.position.map(|position| json!(whole(position)))
        }
        (I::RangeController, "rangeValue", S::Fan(fan)) => Some(json!(fan.range_value())),
        (I::ToggleController, "toggleState", S::Fan(fan)) => {
            fan.oscillating.map(|oscillating| json!(on_off(oscillating)))
        }
        (I::ModeController, "mode", S::Fan(fan)) => fan
            .direction
            .as_ref()
            .map(|direction| json!(format!("direction.{direction}"))),
        (I::LockController, "lockState", S::Lock(lock)) => Some(json!(match lock.locked {
            Some(true) => "LOCKED",
            Some(false) => "UNLOCKED",
            None => "JAMMED",
        })),
        (I::ThermostatController, "targetSetpoint", S::Climate(climate)) => climate
            .target_temperature
            .map(|value| temperature(value, hub_unit)),
        (I::ThermostatController, "lowerSetpoint", S::Climate(climate)) => climate
            .target_temp_low
            .map(|value| temperature(value, hub_unit)),
        (I::ThermostatController, "upperSetpoint", S::Climate(climate)) => climate
            .target_temp_high
            .map(|value| temperature(value, hub_unit)),
        (I::ThermostatController, "thermostatMode", S::Climate(climate)) => {
            if climate.preset_mode.as_deref() == Some(PRESET_ECO) {
                Some(json!(THERMOSTAT_MODE_ECO))
            } else {
                thermostat_mode(&climate.hvac_mode).map(|mode| json!(mode))
            }
        }
        (I::TemperatureSensor, "temperature", S::Climate(climate)) => climate
            .current_temperature
            .map(|value| temperature(value, hub_unit)),
        (I::TemperatureSensor, "temperature", S::Sensor(sensor)) => {
            Some(temperature(sensor.value?, sensor.temperature_unit()?))
        }
        (I::ContactSensor | I::MotionSensor, "detectionState", S::BinarySensor(sensor)) => {
            Some(json!(if sensor.on { "DETECTED" } else { "NOT_DETECTED" }))
        }
        (I::SecurityPanelController, "armState", S::AlarmPanel(panel)) => {
            arm_state(&panel.state).map(|state| json!(state))
        }
        (I::Speaker, "volume", S::MediaPlayer(player)) => player
            .volume_level
            .map(|level| json!(whole(level * 100.0))),
        (I::Speaker, "muted", S::MediaPlayer(player)) => player.is_volume_muted.map(|muted| json!(muted)),
        _ => None,
    }
}

/// Every retrievable property of `capabilities` that currently has a value.
#[must_use]
pub fn report_state(
    view: &EntityView,
    capabilities: &[Capability],
    hub_unit: TemperatureUnit,
) -> Vec<Property> {
    capabilities
        .iter()
        .filter(|capability| capability.retrievable)
        .flat_map(|capability| {
            capability.properties.iter().copied().filter_map(move |name| {
                read_property(view, capability.interface, name, hub_unit).map(|value| Property {
                    namespace: capability.interface.namespace(),
                    name,
                    instance: capability.instance,
                    value,
                })
            })
        })
        .collect()
}
