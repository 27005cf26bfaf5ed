use voicebridge_domain::entity::view::FanState;

use super::{DirectiveContext, Outcome, value_out_of_range};
use crate::smart_home::capabilities::{FAN_DIRECTION, FAN_OSCILLATING, FAN_SPEED, Interface};
use crate::smart_home::error::DirectiveError;
use crate::smart_home::properties::{Property, on_off, whole};

pub(super) fn handle(
    interface: Interface,
    fan: &FanState,
    ctx: &DirectiveContext<'_>,
) -> Result<Outcome, DirectiveError> {
    match (interface, ctx.name()) {
        (Interface::PercentageController, "SetPercentage") => {
            let percentage = whole(ctx.number("percentage")?);
            if !(0..=100).contains(&percentage) {
                return Err(value_out_of_range(percentage, 0, 100));
            }
            Ok(set_percentage(fan, ctx, interface, "percentage", percentage))
        }
        (Interface::PercentageController, "AdjustPercentage") => {
            let target = adjusted(fan, ctx.number("percentageDelta")?);
            Ok(set_percentage(fan, ctx, interface, "percentage", target))
        }
        (Interface::PowerLevelController, "SetPowerLevel") => {
            let level = whole(ctx.number("powerLevel")?);
            if !(0..=100).contains(&level) {
                return Err(value_out_of_range(level, 0, 100));
            }
            Ok(set_percentage(fan, ctx, interface, "powerLevel", level))
        }
        (Interface::PowerLevelController, "AdjustPowerLevel") => {
            let target = adjusted(fan, ctx.number("powerLevelDelta")?);
            Ok(set_percentage(fan, ctx, interface, "powerLevel", target))
        }
        (Interface::RangeController, "SetRangeValue") => {
            let value = whole(ctx.number("rangeValue")?);
            let max = i64::try_from(fan.speed_list.len()).unwrap_or(i64::MAX);
            if !(0..=max).contains(&value) {
                return Err(value_out_of_range(value, 0, max));
            }
            Ok(set_range(fan, ctx, value))
        }
        (Interface::RangeController, "AdjustRangeValue") => {
            let delta = range_delta(ctx)?;
            let max = i64::try_from(fan.speed_list.len()).unwrap_or(i64::MAX);
            let current = i64::try_from(fan.range_value()).unwrap_or(0);
            Ok(set_range(fan, ctx, (current + delta).clamp(0, max)))
        }
        (Interface::ToggleController, "TurnOn" | "TurnOff") => {
            let oscillating = ctx.name() == "TurnOn";
            Ok(
                Outcome::new(ctx.call("fan", "oscillate").with("oscillating", oscillating)).report(
                    Property::new(Interface::ToggleController, "toggleState", on_off(oscillating))
                        .with_instance(Some(FAN_OSCILLATING)),
                ),
            )
        }
        (Interface::ModeController, "SetMode") => {
            let mode = ctx.text("mode")?;
            let direction = mode
                .strip_prefix("direction.")
                .filter(|direction| FanState::DIRECTIONS.contains(direction))
                .ok_or_else(|| DirectiveError::invalid_value(format!("unknown fan mode {mode:?}")))?;
            Ok(
                Outcome::new(ctx.call("fan", "set_direction").with("direction", direction)).report(
                    Property::new(Interface::ModeController, "mode", mode)
                        .with_instance(Some(FAN_DIRECTION)),
                ),
            )
        }
        _ => Err(ctx.unsupported()),
    }
}

/// Current percentage moved by `delta`.
///
/// Going past 100% wraps to off, like going down to 0%.
fn adjusted(fan: &FanState, delta: f64) -> i64 {
    let current = i64::try_from(fan.percentage()).unwrap_or(0);
    match current + whole(delta) {
        target if target > 100 => 0,
        target => target.max(0),
    }
}

/// `percentage` must be in `0..=100`; `0` turns the fan off.
fn set_percentage(
    fan: &FanState,
    ctx: &DirectiveContext<'_>,
    interface: Interface,
    property: &'static str,
    percentage: i64,
) -> Outcome {
    let percentage = match usize::try_from(percentage) {
        Ok(0) | Err(_) => return turn_off(ctx).report(Property::new(interface, property, 0)),
        Ok(percentage) => percentage,
    };

    let index = fan.speed_index_for_percentage(percentage);
    let speed = &fan.speed_list[index];
    Outcome::new(ctx.call("fan", "set_speed").with("speed", speed.as_str()))
        .report(Property::new(interface, property, fan.bucket_percentage(index)))
}

fn set_range(fan: &FanState, ctx: &DirectiveContext<'_>, value: i64) -> Outcome {
    let property = |value: i64| {
        Property::new(Interface::RangeController, "rangeValue", value).with_instance(Some(FAN_SPEED))
    };
    match usize::try_from(value - 1)
        .ok()
        .and_then(|index| fan.speed_list.get(index))
    {
        Some(speed) => Outcome::new(ctx.call("fan", "set_speed").with("speed", speed.as_str()))
            .report(property(value)),
        None => turn_off(ctx).report(property(0)),
    }
}

fn turn_off(ctx: &DirectiveContext<'_>) -> Outcome {
    Outcome::new(ctx.call("fan", "turn_off").with("speed", FanState::SPEED_OFF))
}

/// `rangeValueDelta`, or one step in its direction when
/// `rangeValueDeltaDefault` is set.
fn range_delta(ctx: &DirectiveContext<'_>) -> Result<i64, DirectiveError> {
    let delta = whole(ctx.number("rangeValueDelta")?);
    let use_default = ctx
        .directive
        .field("rangeValueDeltaDefault")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    Ok(if use_default { delta.signum() } else { delta })
}
