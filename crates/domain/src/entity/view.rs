//! Typed per-domain views over raw [`StateRecord`]s.
//!
//! Capability and directive logic never reads the attribute bag directly:
//! a record is translated once into an [`EntityView`] whose [`DomainState`]
//! variant carries exactly the fields that domain exposes.

use super::state;
use super::{AttributeValue, Attributes, EntityDomain, EntityId, StateRecord};
use crate::error::ValidationError;
use crate::temperature::TemperatureUnit;

/// A hub entity translated into a typed, domain-specific record.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub entity_id: EntityId,
    pub domain: EntityDomain,
    pub friendly_name: String,
    pub available: bool,
    pub state: DomainState,
}

impl EntityView {
    /// Translate a raw record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedDomain`] when the entity's
    /// domain is not one the bridge understands.
    pub fn from_record(record: &StateRecord) -> Result<Self, ValidationError> {
        let domain: EntityDomain = record.entity_id.domain().parse()?;
        let attrs = &record.attributes;
        let raw = record.state.as_str();

        let state = match domain {
            EntityDomain::Switch
            | EntityDomain::InputBoolean
            | EntityDomain::Automation
            | EntityDomain::Group
            | EntityDomain::Alert => DomainState::OnOff(OnOffState {
                on: raw == state::ON,
            }),
            EntityDomain::Light => DomainState::Light(LightState::from_attributes(raw, attrs)),
            EntityDomain::Fan => DomainState::Fan(FanState::from_attributes(raw, attrs)),
            EntityDomain::Cover => DomainState::Cover(CoverState {
                closed: raw == state::CLOSED,
                position: attrs.get_f64("current_position").or_else(|| attrs.get_f64("position")),
                features: attrs.supported_features(),
            }),
            EntityDomain::Lock => DomainState::Lock(LockState {
                locked: match raw {
                    state::LOCKED => Some(true),
                    state::UNLOCKED => Some(false),
                    _ => None,
                },
            }),
            EntityDomain::Climate => DomainState::Climate(ClimateState::from_attributes(raw, attrs)),
            EntityDomain::MediaPlayer => DomainState::MediaPlayer(MediaPlayerState {
                state: raw.to_string(),
                volume_level: attrs.get_f64("volume_level"),
                is_volume_muted: attrs.get_bool("is_volume_muted"),
                source_list: attrs.get_str_list("source_list"),
                features: attrs.supported_features(),
            }),
            EntityDomain::BinarySensor => DomainState::BinarySensor(BinarySensorState {
                on: raw == state::ON,
                device_class: attrs.get_str("device_class").map(str::to_string),
            }),
            EntityDomain::Sensor => DomainState::Sensor(SensorState {
                value: raw.trim().parse().ok(),
                unit_of_measurement: attrs.get_str("unit_of_measurement").map(str::to_string),
            }),
            EntityDomain::Script | EntityDomain::Scene => DomainState::Activity(ActivityState {
                can_cancel: attrs.get_bool("can_cancel").unwrap_or(false),
            }),
            EntityDomain::AlarmControlPanel => DomainState::AlarmPanel(AlarmPanelState {
                state: raw.to_string(),
                code_arm_required: attrs.get_bool("code_arm_required").unwrap_or(false),
                code_format: attrs.get_str("code_format").map(str::to_string),
            }),
        };

        Ok(Self {
            entity_id: record.entity_id.clone(),
            domain,
            friendly_name: record.friendly_name(),
            available: record.is_available(),
            state,
        })
    }
}

/// Domain-specific state record.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainState {
    /// switch, input_boolean, automation, group, alert
    OnOff(OnOffState),
    Light(LightState),
    Fan(FanState),
    Cover(CoverState),
    Lock(LockState),
    Climate(ClimateState),
    MediaPlayer(MediaPlayerState),
    BinarySensor(BinarySensorState),
    Sensor(SensorState),
    /// script, scene
    Activity(ActivityState),
    AlarmPanel(AlarmPanelState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnOffState {
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    pub on: bool,
    /// `0..=255`
    pub brightness: Option<f64>,
    /// Hue in degrees, saturation in percent.
    pub hs_color: Option<(f64, f64)>,
    /// Colour temperature in mireds.
    pub color_temp: Option<f64>,
    pub min_mireds: f64,
    pub max_mireds: f64,
    pub features: u32,
}

impl LightState {
    pub const SUPPORT_BRIGHTNESS: u32 = 1;
    pub const SUPPORT_COLOR_TEMP: u32 = 2;
    pub const SUPPORT_COLOR: u32 = 16;

    pub const DEFAULT_MIN_MIREDS: f64 = 153.0;
    pub const DEFAULT_MAX_MIREDS: f64 = 500.0;

    fn from_attributes(raw: &str, attrs: &Attributes) -> Self {
        Self {
            on: raw == state::ON,
            brightness: attrs.get_f64("brightness"),
            hs_color: attrs.get("hs_color").and_then(AttributeValue::as_f64_pair),
            color_temp: attrs.get_f64("color_temp"),
            min_mireds: attrs.get_f64("min_mireds").unwrap_or(Self::DEFAULT_MIN_MIREDS),
            max_mireds: attrs.get_f64("max_mireds").unwrap_or(Self::DEFAULT_MAX_MIREDS),
            features: attrs.supported_features(),
        }
    }

    #[must_use]
    pub fn supports(&self, flag: u32) -> bool {
        self.features & flag != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanState {
    pub on: bool,
    pub speed: Option<String>,
    /// Ordered speeds, slowest first, never containing [`FanState::SPEED_OFF`].
    pub speed_list: Vec<String>,
    pub oscillating: Option<bool>,
    pub direction: Option<String>,
    pub features: u32,
}

impl FanState {
    pub const SUPPORT_SET_SPEED: u32 = 1;
    pub const SUPPORT_OSCILLATE: u32 = 2;
    pub const SUPPORT_DIRECTION: u32 = 4;

    pub const SPEED_OFF: &'static str = "off";
    pub const DEFAULT_SPEEDS: [&'static str; 3] = ["low", "medium", "high"];
    pub const DIRECTIONS: [&'static str; 2] = ["forward", "reverse"];

    fn from_attributes(raw: &str, attrs: &Attributes) -> Self {
        let mut speed_list: Vec<String> = attrs
            .get_str_list("speed_list")
            .into_iter()
            .filter(|speed| speed != Self::SPEED_OFF)
            .collect();
        if speed_list.is_empty() {
            speed_list = Self::DEFAULT_SPEEDS.iter().map(|s| (*s).to_string()).collect();
        }
        Self {
            on: raw == state::ON,
            speed: attrs.get_str("speed").map(str::to_string),
            speed_list,
            oscillating: attrs.get_bool("oscillating"),
            direction: attrs.get_str("direction").map(str::to_string),
            features: attrs.supported_features(),
        }
    }

    #[must_use]
    pub fn supports(&self, flag: u32) -> bool {
        self.features & flag != 0
    }

    /// Position of the current speed in [`speed_list`](Self::speed_list),
    /// `None` when off or unknown.
    #[must_use]
    pub fn speed_index(&self) -> Option<usize> {
        let speed = self.speed.as_deref()?;
        self.speed_list.iter().position(|s| s == speed)
    }

    /// Speed as a 1-based range value, `0` when off or unknown.
    #[must_use]
    pub fn range_value(&self) -> usize {
        self.speed_index().map_or(0, |index| index + 1)
    }

    /// Upper bound of the percentage bucket that speed `index` covers.
    ///
    /// With `n` speeds, bucket `i` covers `(floor(i·100/n), floor((i+1)·100/n)]`;
    /// for three speeds that is `low ≤ 33 < medium ≤ 66 < high ≤ 100`.
    #[must_use]
    pub fn bucket_percentage(&self, index: usize) -> usize {
        match self.speed_list.len() {
            0 => 0,
            count => (index + 1).min(count) * 100 / count,
        }
    }

    /// Current speed as a percentage, `0` when unknown.
    #[must_use]
    pub fn percentage(&self) -> usize {
        self.speed_index().map_or(0, |index| self.bucket_percentage(index))
    }

    /// Speed bucket holding `percentage` (`1..=100`).
    ///
    /// Inverse of [`bucket_percentage`](Self::bucket_percentage) for lists of
    /// up to 100 speeds, so a zero adjustment never moves the speed.
    #[must_use]
    pub fn speed_index_for_percentage(&self, percentage: usize) -> usize {
        let count = self.speed_list.len();
        let percentage = percentage.clamp(1, 100);
        (percentage * count).div_ceil(100).saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverState {
    pub closed: bool,
    /// `0..=100`
    pub position: Option<f64>,
    pub features: u32,
}

impl CoverState {
    pub const SUPPORT_SET_POSITION: u32 = 4;

    #[must_use]
    pub fn supports(&self, flag: u32) -> bool {
        self.features & flag != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    /// `None` when the lock is neither locked nor unlocked (jammed, unknown).
    pub locked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateState {
    /// Current HVAC mode (the entity state).
    pub hvac_mode: String,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub hvac_modes: Vec<String>,
    pub preset_mode: Option<String>,
    pub preset_modes: Vec<String>,
    pub features: u32,
}

impl ClimateState {
    pub const SUPPORT_TARGET_TEMPERATURE: u32 = 1;
    pub const SUPPORT_TARGET_TEMPERATURE_RANGE: u32 = 2;

    /// Hub defaults when the entity does not declare its limits.
    pub const DEFAULT_MIN_TEMP_CELSIUS: f64 = 7.0;
    pub const DEFAULT_MAX_TEMP_CELSIUS: f64 = 35.0;

    fn from_attributes(raw: &str, attrs: &Attributes) -> Self {
        Self {
            hvac_mode: raw.to_string(),
            current_temperature: attrs.get_f64("current_temperature"),
            target_temperature: attrs.get_f64("temperature"),
            target_temp_low: attrs.get_f64("target_temp_low"),
            target_temp_high: attrs.get_f64("target_temp_high"),
            min_temp: attrs.get_f64("min_temp"),
            max_temp: attrs.get_f64("max_temp"),
            hvac_modes: attrs.get_str_list("hvac_modes"),
            preset_mode: attrs.get_str("preset_mode").map(str::to_string),
            preset_modes: attrs.get_str_list("preset_modes"),
            features: attrs.supported_features(),
        }
    }

    #[must_use]
    pub fn supports(&self, flag: u32) -> bool {
        self.features & flag != 0
    }

    /// `(min, max)` in `unit`, falling back to the hub defaults.
    #[must_use]
    pub fn temperature_limits(&self, unit: TemperatureUnit) -> (f64, f64) {
        let min = self.min_temp.unwrap_or_else(|| {
            TemperatureUnit::Celsius.convert(Self::DEFAULT_MIN_TEMP_CELSIUS, unit)
        });
        let max = self.max_temp.unwrap_or_else(|| {
            TemperatureUnit::Celsius.convert(Self::DEFAULT_MAX_TEMP_CELSIUS, unit)
        });
        (min, max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaPlayerState {
    pub state: String,
    /// `0.0..=1.0`
    pub volume_level: Option<f64>,
    pub is_volume_muted: Option<bool>,
    pub source_list: Vec<String>,
    pub features: u32,
}

impl MediaPlayerState {
    pub const SUPPORT_PAUSE: u32 = 1;
    pub const SUPPORT_SEEK: u32 = 2;
    pub const SUPPORT_VOLUME_SET: u32 = 4;
    pub const SUPPORT_VOLUME_MUTE: u32 = 8;
    pub const SUPPORT_PREVIOUS_TRACK: u32 = 16;
    pub const SUPPORT_NEXT_TRACK: u32 = 32;
    pub const SUPPORT_TURN_ON: u32 = 128;
    pub const SUPPORT_TURN_OFF: u32 = 256;
    pub const SUPPORT_PLAY_MEDIA: u32 = 512;
    pub const SUPPORT_VOLUME_STEP: u32 = 1024;
    pub const SUPPORT_SELECT_SOURCE: u32 = 2048;
    pub const SUPPORT_STOP: u32 = 4096;
    pub const SUPPORT_PLAY: u32 = 16384;

    #[must_use]
    pub fn supports(&self, flag: u32) -> bool {
        self.features & flag != 0
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        !matches!(
            self.state.as_str(),
            state::OFF | state::STANDBY | state::UNAVAILABLE | state::UNKNOWN
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySensorState {
    pub on: bool,
    pub device_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    pub value: Option<f64>,
    pub unit_of_measurement: Option<String>,
}

impl SensorState {
    /// The unit when the sensor measures a temperature.
    #[must_use]
    pub fn temperature_unit(&self) -> Option<TemperatureUnit> {
        self.unit_of_measurement
            .as_deref()
            .and_then(TemperatureUnit::from_symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityState {
    pub can_cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmPanelState {
    pub state: String,
    pub code_arm_required: bool,
    pub code_format: Option<String>,
}

impl AlarmPanelState {
    pub const CODE_FORMAT_NUMBER: &'static str = "number";

    #[must_use]
    pub fn is_disarmed(&self) -> bool {
        self.state == state::ALARM_DISARMED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(entity_id: &str, raw: &str, attrs: serde_json::Value) -> EntityView {
        let mut record = StateRecord::new(entity_id.parse().unwrap(), raw);
        record.attributes = serde_json::from_value(attrs).unwrap();
        EntityView::from_record(&record).unwrap()
    }

    #[test]
    fn should_reject_unsupported_domain() {
        let record = StateRecord::new("vacuum.robot".parse().unwrap(), "docked");
        assert!(matches!(
            EntityView::from_record(&record),
            Err(ValidationError::UnsupportedDomain(_))
        ));
    }

    #[test]
    fn should_translate_switch_into_on_off_state() {
        let v = view("switch.test", "on", json!({"friendly_name": "Test switch"}));
        assert_eq!(v.domain, EntityDomain::Switch);
        assert_eq!(v.friendly_name, "Test switch");
        assert_eq!(v.state, DomainState::OnOff(OnOffState { on: true }));
    }

    #[test]
    fn should_default_fan_speed_list_and_drop_off_entry() {
        let v = view("fan.a", "off", json!({"supported_features": 3}));
        let DomainState::Fan(fan) = v.state else {
            panic!("expected fan state");
        };
        assert_eq!(fan.speed_list, vec!["low", "medium", "high"]);

        let v = view(
            "fan.b",
            "on",
            json!({"speed_list": ["off", "slow", "fast"], "speed": "fast"}),
        );
        let DomainState::Fan(fan) = v.state else {
            panic!("expected fan state");
        };
        assert_eq!(fan.speed_list, vec!["slow", "fast"]);
        assert_eq!(fan.speed_index(), Some(1));
    }

    #[test]
    fn should_map_percentages_to_three_speed_buckets() {
        let fan = FanState::from_attributes(state::ON, &Attributes::default());
        let table = [
            (1, "low"),
            (33, "low"),
            (34, "medium"),
            (50, "medium"),
            (66, "medium"),
            (67, "high"),
            (100, "high"),
        ];
        for (percentage, speed) in table {
            let index = fan.speed_index_for_percentage(percentage);
            assert_eq!(fan.speed_list[index], speed, "percentage {percentage}");
        }
        assert_eq!(fan.bucket_percentage(0), 33);
        assert_eq!(fan.bucket_percentage(1), 66);
        assert_eq!(fan.bucket_percentage(2), 100);
    }

    #[test]
    fn should_round_trip_bucket_percentage_for_any_list_length() {
        for count in 1..=100 {
            let attrs: Attributes = [(
                "speed_list",
                AttributeValue::from(serde_json::Value::from(
                    (0..count).map(|i| format!("s{i}")).collect::<Vec<_>>(),
                )),
            )]
            .into_iter()
            .collect();
            let fan = FanState::from_attributes(state::ON, &attrs);
            for index in 0..count {
                let percentage = fan.bucket_percentage(index);
                assert_eq!(fan.speed_index_for_percentage(percentage), index);
            }
        }
    }

    #[test]
    fn should_read_string_color_temp_as_number() {
        let v = view(
            "light.c",
            "on",
            json!({"supported_features": 19, "color_temp": "333", "min_mireds": 142}),
        );
        let DomainState::Light(light) = v.state else {
            panic!("expected light state");
        };
        assert_eq!(light.color_temp, Some(333.0));
        assert_eq!(light.min_mireds, 142.0);
        assert_eq!(light.max_mireds, LightState::DEFAULT_MAX_MIREDS);
        assert!(light.supports(LightState::SUPPORT_COLOR));
    }

    #[test]
    fn should_mark_unavailable_entities() {
        let v = view("binary_sensor.door", "unavailable", json!({"device_class": "door"}));
        assert!(!v.available);
    }

    #[test]
    fn should_fall_back_to_default_climate_limits() {
        let v = view("climate.t", "heat", json!({}));
        let DomainState::Climate(climate) = v.state else {
            panic!("expected climate state");
        };
        assert_eq!(climate.temperature_limits(TemperatureUnit::Celsius), (7.0, 35.0));
    }

    #[test]
    fn should_parse_numeric_sensor_value() {
        let v = view("sensor.t", "42", json!({"unit_of_measurement": "\u{b0}F"}));
        let DomainState::Sensor(sensor) = v.state else {
            panic!("expected sensor state");
        };
        assert_eq!(sensor.value, Some(42.0));
        assert_eq!(sensor.temperature_unit(), Some(TemperatureUnit::Fahrenheit));
    }
}
