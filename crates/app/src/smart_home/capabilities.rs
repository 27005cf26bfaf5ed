//! Capability registry: which interfaces an entity exposes.

use serde_json::{Map, Value, json};

use voicebridge_domain::entity::view::{
    AlarmPanelState, ClimateState, CoverState, DomainState, EntityView, FanState, LightState,
    MediaPlayerState,
};

use super::properties::thermostat_modes;

/// An externally visible control or sensing facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    PowerController,
    BrightnessController,
    ColorController,
    ColorTemperatureController,
    PercentageController,
    PowerLevelController,
    RangeController,
    ToggleController,
    ModeController,
    LockController,
    ThermostatController,
    TemperatureSensor,
    ContactSensor,
    MotionSensor,
    DoorbellEventSource,
    SceneController,
    SecurityPanelController,
    Speaker,
    StepSpeaker,
    PlaybackController,
    InputController,
    ChannelController,
    EndpointHealth,
}

impl Interface {
    pub const ALL: [Self; 23] = [
        Self::PowerController,
        Self::BrightnessController,
        Self::ColorController,
        Self::ColorTemperatureController,
        Self::PercentageController,
        Self::PowerLevelController,
        Self::RangeController,
        Self::ToggleController,
        Self::ModeController,
        Self::LockController,
        Self::ThermostatController,
        Self::TemperatureSensor,
        Self::ContactSensor,
        Self::MotionSensor,
        Self::DoorbellEventSource,
        Self::SceneController,
        Self::SecurityPanelController,
        Self::Speaker,
        Self::StepSpeaker,
        Self::PlaybackController,
        Self::InputController,
        Self::ChannelController,
        Self::EndpointHealth,
    ];

    /// Wire namespace, e.g. `Alexa.PowerController`.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::PowerController => "Alexa.PowerController",
            Self::BrightnessController => "Alexa.BrightnessController",
            Self::ColorController => "Alexa.ColorController",
            Self::ColorTemperatureController => "Alexa.ColorTemperatureController",
            Self::PercentageController => "Alexa.PercentageController",
            Self::PowerLevelController => "Alexa.PowerLevelController",
            Self::RangeController => "Alexa.RangeController",
            Self::ToggleController => "Alexa.ToggleController",
            Self::ModeController => "Alexa.ModeController",
            Self::LockController => "Alexa.LockController",
            Self::ThermostatController => "Alexa.ThermostatController",
            Self::TemperatureSensor => "Alexa.TemperatureSensor",
            Self::ContactSensor => "Alexa.ContactSensor",
            Self::MotionSensor => "Alexa.MotionSensor",
            Self::DoorbellEventSource => "Alexa.DoorbellEventSource",
            Self::SceneController => "Alexa.SceneController",
            Self::SecurityPanelController => "Alexa.SecurityPanelController",
            Self::Speaker => "Alexa.Speaker",
            Self::StepSpeaker => "Alexa.StepSpeaker",
            Self::PlaybackController => "Alexa.PlaybackController",
            Self::InputController => "Alexa.InputController",
            Self::ChannelController => "Alexa.ChannelController",
            Self::EndpointHealth => "Alexa.EndpointHealth",
        }
    }

    #[must_use]
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interface| interface.namespace() == namespace)
    }

    /// Directive names the interface accepts.
    #[must_use]
    pub fn directives(self) -> &'static [&'static str] {
        match self {
            Self::PowerController | Self::ToggleController => &["TurnOn", "TurnOff"],
            Self::BrightnessController => &["SetBrightness", "AdjustBrightness"],
            Self::ColorController => &["SetColor"],
            Self::ColorTemperatureController => &[
                "SetColorTemperature",
                "IncreaseColorTemperature",
                "DecreaseColorTemperature",
            ],
            Self::PercentageController => &["SetPercentage", "AdjustPercentage"],
            Self::PowerLevelController => &["SetPowerLevel", "AdjustPowerLevel"],
            Self::RangeController => &["SetRangeValue", "AdjustRangeValue"],
            Self::ModeController => &["SetMode", "AdjustMode"],
            Self::LockController => &["Lock", "Unlock"],
            Self::ThermostatController => &[
                "SetTargetTemperature",
                "AdjustTargetTemperature",
                "SetThermostatMode",
            ],
            Self::SceneController => &["Activate", "Deactivate"],
            Self::SecurityPanelController => &["Arm", "Disarm"],
            Self::Speaker => &["SetVolume", "AdjustVolume", "SetMute"],
            Self::StepSpeaker => &["AdjustVolume", "SetMute"],
            Self::PlaybackController => &["Play", "Pause", "Stop", "Next", "Previous"],
            Self::InputController => &["SelectInput"],
            Self::ChannelController => &["ChangeChannel", "SkipChannels"],
            Self::TemperatureSensor
            | Self::ContactSensor
            | Self::MotionSensor
            | Self::DoorbellEventSource
            | Self::EndpointHealth => &[],
        }
    }

    /// Every property the interface can report.
    #[must_use]
    pub fn properties(self) -> &'static [&'static str] {
        match self {
            Self::PowerController => &["powerState"],
            Self::BrightnessController => &["brightness"],
            Self::ColorController => &["color"],
            Self::ColorTemperatureController => &["colorTemperatureInKelvin"],
            Self::PercentageController => &["percentage"],
            Self::PowerLevelController => &["powerLevel"],
            Self::RangeController => &["rangeValue"],
            Self::ToggleController => &["toggleState"],
            Self::ModeController => &["mode"],
            Self::LockController => &["lockState"],
            Self::ThermostatController => {
                &["targetSetpoint", "lowerSetpoint", "upperSetpoint", "thermostatMode"]
            }
            Self::TemperatureSensor => &["temperature"],
            Self::ContactSensor | Self::MotionSensor => &["detectionState"],
            Self::SecurityPanelController => &["armState"],
            Self::Speaker => &["volume", "muted"],
            Self::EndpointHealth => &["connectivity"],
            Self::DoorbellEventSource
            | Self::SceneController
            | Self::StepSpeaker
            | Self::PlaybackController
            | Self::InputController
            | Self::ChannelController => &[],
        }
    }
}

/// One interface instance on an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    pub interface: Interface,
    /// Disambiguates multi-instance interfaces (`fan.speed`, ...).
    pub instance: Option<&'static str>,
    pub properties: Vec<&'static str>,
    pub proactively_reported: bool,
    pub retrievable: bool,
    /// Asset ids used as localisable friendly names.
    pub friendly_names: Vec<&'static str>,
    pub configuration: Option<Value>,
    /// Interface-specific top level fields (`supportsDeactivation`, ...).
    pub extra: Map<String, Value>,
}

impl Capability {
    #[must_use]
    pub fn new(interface: Interface) -> Self {
        let properties = interface.properties().to_vec();
        Self {
            interface,
            instance: None,
            retrievable: !properties.is_empty(),
            properties,
            proactively_reported: false,
            friendly_names: Vec::new(),
            configuration: None,
            extra: Map::new(),
        }
    }

    fn instance(interface: Interface, instance: &'static str, asset: &'static str) -> Self {
        Self {
            instance: Some(instance),
            friendly_names: vec![asset],
            ..Self::new(interface)
        }
    }

    #[must_use]
    fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = Some(configuration);
        self
    }

    #[must_use]
    fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Whether a directive for `interface`/`instance` targets this capability.
    #[must_use]
    pub fn accepts(&self, interface: Interface, instance: Option<&str>) -> bool {
        self.interface == interface && (self.instance.is_none() || self.instance == instance)
    }

    /// Discovery JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut capability = Map::new();
        capability.insert("type".to_string(), json!("AlexaInterface"));
        capability.insert("interface".to_string(), json!(self.interface.namespace()));
        capability.insert("version".to_string(), json!("3"));
        if let Some(instance) = self.instance {
            capability.insert("instance".to_string(), json!(instance));
        }
        if !self.properties.is_empty() {
            let supported: Vec<Value> = self
                .properties
                .iter()
                .map(|name| json!({ "name": name }))
                .collect();
            let mut properties = Map::new();
            properties.insert("supported".to_string(), Value::from(supported));
            properties.insert(
                "proactivelyReported".to_string(),
                json!(self.proactively_reported),
            );
            properties.insert("retrievable".to_string(), json!(self.retrievable));
            if self.instance.is_some() {
                properties.insert("nonControllable".to_string(), json!(false));
            }
            capability.insert("properties".to_string(), Value::Object(properties));
        }
        if !self.friendly_names.is_empty() {
            let names: Vec<Value> = self
                .friendly_names
                .iter()
                .map(|asset| json!({"@type": "asset", "value": {"assetId": asset}}))
                .collect();
            capability.insert(
                "capabilityResources".to_string(),
                json!({ "friendlyNames": names }),
            );
        }
        if let Some(configuration) = &self.configuration {
            capability.insert("configuration".to_string(), configuration.clone());
        }
        capability.extend(self.extra.clone());
        Value::Object(capability)
    }
}

pub(crate) const FAN_SPEED: &str = "fan.speed";
pub(crate) const FAN_OSCILLATING: &str = "fan.oscillating";
pub(crate) const FAN_DIRECTION: &str = "fan.direction";

const CONTACT_CLASSES: [&str; 4] = ["door", "garage_door", "opening", "window"];
const MOTION_CLASSES: [&str; 1] = ["motion"];
const DOORBELL_CLASSES: [&str; 1] = ["occupancy"];

/// Capabilities of an entity, recomputed on every call.
///
/// Empty when the entity cannot be represented; otherwise ends with
/// `EndpointHealth`.
#[must_use]
pub fn capabilities_for(view: &EntityView) -> Vec<Capability> {
    let mut capabilities = domain_capabilities(view);
    if !capabilities.is_empty() {
        capabilities.push(Capability::new(Interface::EndpointHealth));
    }
    capabilities
}

fn domain_capabilities(view: &EntityView) -> Vec<Capability> {
    match &view.state {
        DomainState::OnOff(_) => vec![Capability::new(Interface::PowerController)],
        DomainState::Light(light) => light_capabilities(light),
        DomainState::Fan(fan) => fan_capabilities(fan),
        DomainState::Cover(cover) => {
            let mut capabilities = vec![Capability::new(Interface::PowerController)];
            if cover.supports(CoverState::SUPPORT_SET_POSITION) {
                capabilities.push(Capability::new(Interface::PercentageController));
            }
            capabilities
        }
        DomainState::Lock(_) => vec![Capability::new(Interface::LockController)],
        DomainState::Climate(climate) => vec![
            Capability::new(Interface::PowerController),
            thermostat_capability(climate),
            Capability::new(Interface::TemperatureSensor),
        ],
        DomainState::MediaPlayer(player) => media_player_capabilities(player),
        DomainState::BinarySensor(sensor) => {
            let class = sensor.device_class.as_deref().unwrap_or_default();
            if CONTACT_CLASSES.contains(&class) {
                vec![Capability::new(Interface::ContactSensor)]
            } else if MOTION_CLASSES.contains(&class) {
                vec![Capability::new(Interface::MotionSensor)]
            } else if DOORBELL_CLASSES.contains(&class) {
                vec![Capability::new(Interface::DoorbellEventSource)
                    .with_extra("proactivelyReported", json!(true))]
            } else {
                Vec::new()
            }
        }
        DomainState::Sensor(sensor) => {
            if sensor.temperature_unit().is_some() {
                vec![Capability::new(Interface::TemperatureSensor)]
            } else {
                Vec::new()
            }
        }
        DomainState::Activity(activity) => vec![Capability::new(Interface::SceneController)
            .with_extra("supportsDeactivation", json!(activity.can_cancel))],
        DomainState::AlarmPanel(panel) => {
            if panel.code_arm_required {
                Vec::new()
            } else {
                vec![security_panel_capability(panel)]
            }
        }
    }
}

fn light_capabilities(light: &LightState) -> Vec<Capability> {
    let mut capabilities = vec![Capability::new(Interface::PowerController)];
    if light.supports(LightState::SUPPORT_BRIGHTNESS) {
        capabilities.push(Capability::new(Interface::BrightnessController));
    }
    if light.supports(LightState::SUPPORT_COLOR) {
        capabilities.push(Capability::new(Interface::ColorController));
    }
    if light.supports(LightState::SUPPORT_COLOR_TEMP) {
        capabilities.push(Capability::new(Interface::ColorTemperatureController));
    }
    capabilities
}

fn fan_capabilities(fan: &FanState) -> Vec<Capability> {
    let mut capabilities = vec![Capability::new(Interface::PowerController)];
    if fan.supports(FanState::SUPPORT_SET_SPEED) {
        capabilities.push(Capability::new(Interface::PercentageController));
        capabilities.push(Capability::new(Interface::PowerLevelController));
        capabilities.push(
            Capability::instance(Interface::RangeController, FAN_SPEED, "Alexa.Setting.FanSpeed")
                .with_configuration(fan_speed_configuration(fan)),
        );
    }
    if fan.supports(FanState::SUPPORT_OSCILLATE) {
        capabilities.push(Capability::instance(
            Interface::ToggleController,
            FAN_OSCILLATING,
            "Alexa.Setting.Oscillate",
        ));
    }
    if fan.supports(FanState::SUPPORT_DIRECTION) {
        capabilities.push(
            Capability::instance(Interface::ModeController, FAN_DIRECTION, "Alexa.Setting.Direction")
                .with_configuration(fan_direction_configuration()),
        );
    }
    capabilities
}

fn text_resource(text: &str) -> Value {
    json!({"@type": "text", "value": {"text": text, "locale": "en-US"}})
}

fn fan_speed_configuration(fan: &FanState) -> Value {
    let count = fan.speed_list.len();
    let presets: Vec<Value> = fan
        .speed_list
        .iter()
        .enumerate()
        .map(|(index, speed)| {
            let mut names = vec![text_resource(speed)];
            if index == 0 {
                names.push(json!({"@type": "asset", "value": {"assetId": "Alexa.Value.Minimum"}}));
            }
            if index + 1 == count {
                names.push(json!({"@type": "asset", "value": {"assetId": "Alexa.Value.Maximum"}}));
            }
            json!({
                "rangeValue": index + 1,
                "presetResources": {"friendlyNames": names},
            })
        })
        .collect();
    json!({
        "supportedRange": {"minimumValue": 1, "maximumValue": count, "precision": 1},
        "presets": presets,
    })
}

fn fan_direction_configuration() -> Value {
    let modes: Vec<Value> = FanState::DIRECTIONS
        .iter()
        .map(|direction| {
            json!({
                "value": format!("direction.{direction}"),
                "modeResources": {"friendlyNames": [text_resource(direction)]},
            })
        })
        .collect();
    json!({"ordered": false, "supportedModes": modes})
}

fn thermostat_capability(climate: &ClimateState) -> Capability {
    let mut capability = Capability::new(Interface::ThermostatController);
    capability.properties.retain(|name| match *name {
        "targetSetpoint" => climate.supports(ClimateState::SUPPORT_TARGET_TEMPERATURE),
        "lowerSetpoint" | "upperSetpoint" => {
            climate.supports(ClimateState::SUPPORT_TARGET_TEMPERATURE_RANGE)
        }
        _ => true,
    });
    let modes: Vec<Value> = thermostat_modes(climate)
        .into_iter()
        .map(|mode| json!({ "value": mode }))
        .collect();
    capability.with_configuration(json!({"supportsScheduling": false, "supportedModes": modes}))
}

fn media_player_capabilities(player: &MediaPlayerState) -> Vec<Capability> {
    let mut capabilities = vec![Capability::new(Interface::PowerController)];
    if player.supports(MediaPlayerState::SUPPORT_VOLUME_SET) {
        capabilities.push(Capability::new(Interface::Speaker));
    }
    if player.supports(MediaPlayerState::SUPPORT_VOLUME_MUTE | MediaPlayerState::SUPPORT_VOLUME_STEP) {
        capabilities.push(Capability::new(Interface::StepSpeaker));
    }

    let operations: Vec<&str> = [
        (MediaPlayerState::SUPPORT_PLAY, "Play"),
        (MediaPlayerState::SUPPORT_PAUSE, "Pause"),
        (MediaPlayerState::SUPPORT_STOP, "Stop"),
        (MediaPlayerState::SUPPORT_NEXT_TRACK, "Next"),
        (MediaPlayerState::SUPPORT_PREVIOUS_TRACK, "Previous"),
    ]
    .into_iter()
    .filter(|(flag, _)| player.supports(*flag))
    .map(|(_, operation)| operation)
    .collect();
    if !operations.is_empty() {
        capabilities.push(
            Capability::new(Interface::PlaybackController)
                .with_configuration(json!({ "supportedOperations": operations })),
        );
    }

    if player.supports(MediaPlayerState::SUPPORT_SELECT_SOURCE) {
        let inputs: Vec<Value> = player
            .source_list
            .iter()
            .map(|source| json!({ "name": source }))
            .collect();
        capabilities.push(Capability::new(Interface::InputController).with_extra("inputs", Value::from(inputs)));
    }
    if player.supports(MediaPlayerState::SUPPORT_PLAY_MEDIA) {
        capabilities.push(Capability::new(Interface::ChannelController));
    }
    capabilities
}

fn security_panel_capability(panel: &AlarmPanelState) -> Capability {
    let mut configuration = json!({
        "supportedArmStates": [
            {"value": "ARMED_AWAY"},
            {"value": "ARMED_STAY"},
            {"value": "ARMED_NIGHT"},
            {"value": "DISARMED"},
        ],
    });
    if panel.code_format.as_deref() == Some(AlarmPanelState::CODE_FORMAT_NUMBER) {
        configuration["supportedAuthorizationTypes"] = json!([{"type": "FOUR_DIGIT_PIN"}]);
    }
    Capability::new(Interface::SecurityPanelController).with_configuration(configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voicebridge_domain::entity::StateRecord;

    fn capabilities(entity_id: &str, state: &str, attrs: Value) -> Vec<Capability> {
        let mut record = StateRecord::new(entity_id.parse().unwrap(), state);
        record.attributes = serde_json::from_value(attrs).unwrap();
        capabilities_for(&EntityView::from_record(&record).unwrap())
    }

    fn interfaces(capabilities: &[Capability]) -> Vec<Interface> {
        capabilities.iter().map(|c| c.interface).collect()
    }

    #[test]
    fn should_give_switch_power_and_health() {
        let caps = capabilities("switch.test", "on", json!({}));
        assert_eq!(
            interfaces(&caps),
            vec![Interface::PowerController, Interface::EndpointHealth]
        );
    }

    #[test]
    fn should_add_light_controllers_from_feature_flags() {
        let caps = capabilities("light.test_3", "on", json!({"supported_features": 19}));
        assert_eq!(
            interfaces(&caps),
            vec![
                Interface::PowerController,
                Interface::BrightnessController,
                Interface::ColorController,
                Interface::ColorTemperatureController,
                Interface::EndpointHealth,
            ]
        );
    }

    #[test]
    fn should_describe_fan_speed_range_when_speed_capable() {
        let caps = capabilities(
            "fan.test_2",
            "off",
            json!({"supported_features": 1, "speed_list": ["low", "medium", "high"]}),
        );
        let range = caps
            .iter()
            .find(|c| c.interface == Interface::RangeController)
            .unwrap()
            .to_json();
        assert_eq!(range["instance"], "fan.speed");
        assert_eq!(range["properties"]["nonControllable"], false);
        assert_eq!(range["properties"]["supported"], json!([{"name": "rangeValue"}]));
        assert_eq!(
            range["capabilityResources"]["friendlyNames"][0],
            json!({"@type": "asset", "value": {"assetId": "Alexa.Setting.FanSpeed"}})
        );
        assert_eq!(range["configuration"]["supportedRange"]["maximumValue"], 3);
    }

    #[test]
    fn should_keep_plain_power_capability_free_of_resources() {
        let caps = capabilities("fan.test_1", "off", json!({}));
        let power = caps[0].to_json();
        assert!(power.get("capabilityResources").is_none());
        assert!(power.get("configuration").is_none());
        assert!(power["properties"].get("nonControllable").is_none());
    }

    #[test]
    fn should_list_fan_directions_as_unordered_modes() {
        let caps = capabilities("fan.test_4", "on", json!({"supported_features": 5}));
        let mode = caps
            .iter()
            .find(|c| c.interface == Interface::ModeController)
            .unwrap()
            .to_json();
        assert_eq!(mode["configuration"]["ordered"], false);
        assert_eq!(
            mode["configuration"]["supportedModes"][1],
            json!({
                "value": "direction.reverse",
                "modeResources": {"friendlyNames": [
                    {"@type": "text", "value": {"text": "reverse", "locale": "en-US"}}
                ]},
            })
        );
    }

    #[test]
    fn should_exclude_unknown_sensor_quantities() {
        assert!(capabilities("sensor.sickness", "0.1", json!({"unit_of_measurement": "garn"})).is_empty());
        assert!(capabilities("binary_sensor.smoke", "on", json!({"device_class": "smoke"})).is_empty());
    }

    #[test]
    fn should_exclude_alarm_panel_requiring_arm_code() {
        let caps = capabilities("alarm_control_panel.test_3", "disarmed", json!({"code_arm_required": true}));
        assert!(caps.is_empty());
    }

    #[test]
    fn should_advertise_pin_for_numeric_alarm_code() {
        let caps = capabilities(
            "alarm_control_panel.test_1",
            "disarmed",
            json!({"code_arm_required": false, "code_format": "number"}),
        );
        let panel = caps[0].to_json();
        assert_eq!(
            panel["configuration"]["supportedAuthorizationTypes"],
            json!([{"type": "FOUR_DIGIT_PIN"}])
        );
    }

    #[test]
    fn should_report_scene_deactivation_support_from_can_cancel() {
        let caps = capabilities("script.test_2", "off", json!({"can_cancel": true}));
        assert_eq!(caps[0].to_json()["supportsDeactivation"], true);
        assert!(caps[0].to_json().get("properties").is_none());
        let caps = capabilities("scene.test", "off", json!({}));
        assert_eq!(caps[0].to_json()["supportsDeactivation"], false);
    }

    #[test]
    fn should_derive_media_player_interfaces_from_features() {
        let caps = capabilities("media_player.test", "off", json!({"supported_features": 0xFA3F}));
        assert_eq!(
            interfaces(&caps),
            vec![
                Interface::PowerController,
                Interface::Speaker,
                Interface::StepSpeaker,
                Interface::PlaybackController,
                Interface::InputController,
                Interface::ChannelController,
                Interface::EndpointHealth,
            ]
        );
    }

    #[test]
    fn should_filter_thermostat_properties_by_features() {
        let caps = capabilities(
            "climate.test",
            "heat",
            json!({"supported_features": 1, "hvac_modes": ["heat", "off"]}),
        );
        let thermostat = &caps[1];
        assert_eq!(thermostat.properties, vec!["targetSetpoint", "thermostatMode"]);
        assert_eq!(
            thermostat.configuration.as_ref().unwrap()["supportedModes"],
            json!([{"value": "HEAT"}, {"value": "OFF"}])
        );
    }

    #[test]
    fn should_match_instance_only_for_multi_instance_capabilities() {
        let power = Capability::new(Interface::PowerController);
        assert!(power.accepts(Interface::PowerController, Some("anything")));
        let range = Capability::instance(Interface::RangeController, FAN_SPEED, "Alexa.Setting.FanSpeed");
        assert!(range.accepts(Interface::RangeController, Some("fan.speed")));
        assert!(!range.accepts(Interface::RangeController, Some("switch.speed")));
        assert!(!range.accepts(Interface::RangeController, None));
    }

    #[test]
    fn should_resolve_namespace_round_trip() {
        for interface in Interface::ALL {
            assert_eq!(Interface::from_namespace(interface.namespace()), Some(interface));
        }
        assert_eq!(Interface::from_namespace("Alexa.HAHAAH"), None);
    }
}
