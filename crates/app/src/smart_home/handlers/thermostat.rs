use serde_json::Value;

use voicebridge_domain::entity::view::ClimateState;
use voicebridge_domain::temperature::TemperatureUnit;

use super::{DirectiveContext, Outcome, missing, number_in};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::{DirectiveError, ErrorType};
use crate::smart_home::properties::{
    PRESET_ECO, Property, THERMOSTAT_MODE_ECO, hvac_modes_for, temperature, unit_from_scale,
};

/// Payload keys of `SetTargetTemperature` and the hub attribute each maps to.
const SETPOINTS: [(&str, &str); 3] = [
    ("targetSetpoint", "temperature"),
    ("lowerSetpoint", "target_temp_low"),
    ("upperSetpoint", "target_temp_high"),
];

pub(super) fn handle(climate: &ClimateState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    match ctx.name() {
        "SetTargetTemperature" => set_target_temperature(climate, ctx),
        "AdjustTargetTemperature" => adjust_target_temperature(climate, ctx),
        "SetThermostatMode" => set_thermostat_mode(climate, ctx),
        _ => Err(ctx.unsupported()),
    }
}

/// Unit named by a temperature object's `scale`, Celsius when absent.
fn scale_of(object: &Value) -> Result<TemperatureUnit, DirectiveError> {
    match object.get("scale").and_then(Value::as_str) {
        None => Ok(TemperatureUnit::Celsius),
        Some(scale) => unit_from_scale(scale)
            .ok_or_else(|| DirectiveError::invalid_value(format!("unknown temperature scale {scale:?}"))),
    }
}

/// Absolute temperature object converted into the hub unit.
fn setpoint(object: &Value, hub_unit: TemperatureUnit) -> Result<f64, DirectiveError> {
    let value = number_in(object, "value")?;
    Ok(scale_of(object)?.convert(value, hub_unit))
}

fn out_of_range(value: f64, (min, max): (f64, f64), hub_unit: TemperatureUnit) -> DirectiveError {
    DirectiveError::new(
        ErrorType::TemperatureValueOutOfRange,
        format!("{value} {hub_unit} is outside {min}..={max}"),
    )
    .with_valid_range(temperature(min, hub_unit), temperature(max, hub_unit))
}

fn check_limits(value: f64, limits: (f64, f64), hub_unit: TemperatureUnit) -> Result<f64, DirectiveError> {
    if value < limits.0 || value > limits.1 {
        return Err(out_of_range(value, limits, hub_unit));
    }
    Ok(value)
}

fn set_target_temperature(climate: &ClimateState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let hub_unit = ctx.hub_unit;
    let limits = climate.temperature_limits(hub_unit);

    let mut call = ctx.call("climate", "set_temperature");
    let mut properties = Vec::new();
    let mut requested = Vec::new();
    for (key, attribute) in SETPOINTS {
        let Some(object) = ctx.directive.field(key) else {
            continue;
        };
        let value = check_limits(setpoint(object, hub_unit)?, limits, hub_unit)?;
        requested.push((key, value));
        call = call.with(attribute, value);
        properties.push(Property::new(
            Interface::ThermostatController,
            key,
            temperature(value, hub_unit),
        ));
    }
    if requested.is_empty() {
        return Err(missing("targetSetpoint"));
    }

    let lookup = |key: &str| requested.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
    if let (Some(lower), Some(upper)) = (lookup("lowerSetpoint"), lookup("upperSetpoint"))
        && lower > upper
    {
        return Err(out_of_range(lower, limits, hub_unit));
    }

    Ok(properties
        .into_iter()
        .fold(Outcome::new(call), Outcome::report))
}

fn adjust_target_temperature(climate: &ClimateState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let hub_unit = ctx.hub_unit;
    let delta_object = ctx.field("targetSetpointDelta")?;
    let delta = scale_of(delta_object)?.convert_interval(number_in(delta_object, "value")?, hub_unit);
    let current = climate
        .target_temperature
        .ok_or_else(|| DirectiveError::invalid_value("current target temperature is unknown"))?;

    let limits = climate.temperature_limits(hub_unit);
    let value = check_limits(current + delta, limits, hub_unit)?;

    Ok(
        Outcome::new(ctx.call("climate", "set_temperature").with("temperature", value)).report(
            Property::new(
                Interface::ThermostatController,
                "targetSetpoint",
                temperature(value, hub_unit),
            ),
        ),
    )
}

fn set_thermostat_mode(climate: &ClimateState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let field = ctx.field("thermostatMode")?;
    let mode = field
        .as_str()
        .or_else(|| field.get("value").and_then(Value::as_str))
        .ok_or_else(|| missing("thermostatMode"))?;
    let unsupported = || {
        DirectiveError::new(
            ErrorType::UnsupportedThermostatMode,
            format!("thermostat mode {mode:?} is not supported by {}", ctx.view.entity_id),
        )
    };

    if mode == THERMOSTAT_MODE_ECO {
        if !climate.preset_modes.iter().any(|preset| preset == PRESET_ECO) {
            return Err(unsupported());
        }
        return Ok(
            Outcome::new(ctx.call("climate", "set_preset_mode").with("preset_mode", PRESET_ECO)).report(
                Property::new(Interface::ThermostatController, "thermostatMode", THERMOSTAT_MODE_ECO),
            ),
        );
    }

    let hvac_mode = hvac_modes_for(mode)
        .find(|candidate| climate.hvac_modes.iter().any(|supported| supported == candidate))
        .ok_or_else(unsupported)?;
    Ok(
        Outcome::new(ctx.call("climate", "set_hvac_mode").with("hvac_mode", hvac_mode)).report(
            Property::new(Interface::ThermostatController, "thermostatMode", mode.to_string()),
        ),
    )
}
