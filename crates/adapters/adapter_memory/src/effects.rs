//! State changes applied for well-known services when effects are enabled.
//!
//! Only the services the bridge issues are covered; anything else is
//! recorded without touching the record.

use serde_json::Value;
use voicebridge_domain::color::kelvin_to_mired;
use voicebridge_domain::entity::{StateRecord, state};
use voicebridge_domain::service::ServiceCall;

pub(crate) fn apply(record: &mut StateRecord, call: &ServiceCall) {
    let data = &call.data;
    match call.service.as_str() {
        "turn_on" => {
            record.state = state::ON.to_string();
            if let Some(pct) = data.get("brightness_pct").and_then(Value::as_f64) {
                record
                    .attributes
                    .insert("brightness", (pct * 255.0 / 100.0).round());
            }
            if let Some(rgb) = data.get("rgb_color") {
                record.attributes.insert("rgb_color", rgb.clone());
            }
            if let Some(kelvin) = data.get("kelvin").and_then(Value::as_f64) {
                record.attributes.insert("color_temp", kelvin_to_mired(kelvin));
            }
            if let Some(mireds) = data.get("color_temp").and_then(Value::as_f64) {
                record.attributes.insert("color_temp", mireds);
            }
        }
        "turn_off" => record.state = state::OFF.to_string(),
        "lock" => record.state = state::LOCKED.to_string(),
        "unlock" => record.state = state::UNLOCKED.to_string(),
        "open_cover" => {
            record.state = state::OPEN.to_string();
            record.attributes.insert("current_position", 100_i64);
        }
        "close_cover" => {
            record.state = state::CLOSED.to_string();
            record.attributes.insert("current_position", 0_i64);
        }
        "set_cover_position" => {
            if let Some(position) = data.get("position").and_then(Value::as_i64) {
                record.attributes.insert("current_position", position);
                let next = if position > 0 { state::OPEN } else { state::CLOSED };
                record.state = next.to_string();
            }
        }
        "set_speed" => copy_str(record, data.get("speed"), "speed", true),
        "oscillate" => {
            if let Some(on) = data.get("oscillating").and_then(Value::as_bool) {
                record.attributes.insert("oscillating", on);
            }
        }
        "set_direction" => copy_str(record, data.get("direction"), "direction", false),
        "volume_set" => {
            if let Some(level) = data.get("volume_level").and_then(Value::as_f64) {
                record.attributes.insert("volume_level", level);
            }
        }
        "volume_mute" => {
            if let Some(muted) = data.get("is_volume_muted").and_then(Value::as_bool) {
                record.attributes.insert("is_volume_muted", muted);
            }
        }
        "select_source" => copy_str(record, data.get("source"), "source", false),
        "media_play" => record.state = "playing".to_string(),
        "media_pause" => record.state = "paused".to_string(),
        "media_stop" => record.state = "idle".to_string(),
        "set_temperature" => {
            for key in ["temperature", "target_temp_low", "target_temp_high"] {
                if let Some(value) = data.get(key).and_then(Value::as_f64) {
                    record.attributes.insert(key, value);
                }
            }
        }
        "set_hvac_mode" => {
            if let Some(mode) = data.get("hvac_mode").and_then(Value::as_str) {
                record.state = mode.to_string();
            }
        }
        "set_preset_mode" => copy_str(record, data.get("preset_mode"), "preset_mode", false),
        "alarm_arm_away" => record.state = state::ALARM_ARMED_AWAY.to_string(),
        "alarm_arm_home" => record.state = state::ALARM_ARMED_HOME.to_string(),
        "alarm_arm_night" => record.state = state::ALARM_ARMED_NIGHT.to_string(),
        "alarm_disarm" => record.state = state::ALARM_DISARMED.to_string(),
        _ => {}
    }
}

fn copy_str(record: &mut StateRecord, value: Option<&Value>, key: &str, turns_on: bool) {
    if let Some(value) = value.and_then(Value::as_str) {
        record.attributes.insert(key, value);
        if turns_on {
            record.state = state::ON.to_string();
        }
    }
}
