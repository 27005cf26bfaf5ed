use serde_json::Value;

use voicebridge_domain::color::{hsb_to_rgb, mired_to_kelvin};
use voicebridge_domain::entity::view::LightState;

use super::{DirectiveContext, Outcome, number_in, value_out_of_range};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::DirectiveError;
use crate::smart_home::properties::{Property, whole};

/// Mired step used by the colour temperature increase/decrease directives.
const MIRED_STEP: f64 = 50.0;

pub(super) fn handle(
    interface: Interface,
    light: &LightState,
    ctx: &DirectiveContext<'_>,
) -> Result<Outcome, DirectiveError> {
    match (interface, ctx.name()) {
        (Interface::BrightnessController, "SetBrightness") => {
            let brightness = whole(ctx.number("brightness")?);
            if !(0..=100).contains(&brightness) {
                return Err(value_out_of_range(brightness, 0, 100));
            }
            Ok(set_brightness(ctx, brightness))
        }
        (Interface::BrightnessController, "AdjustBrightness") => {
            let current = light
                .brightness
                .map_or(0, |brightness| whole(brightness / 255.0 * 100.0));
            let brightness = (current + whole(ctx.number("brightnessDelta")?)).clamp(0, 100);
            Ok(set_brightness(ctx, brightness))
        }
        (Interface::ColorController, "SetColor") => set_color(ctx),
        (Interface::ColorTemperatureController, "SetColorTemperature") => {
            let kelvin = whole(ctx.number("colorTemperatureInKelvin")?);
            Ok(Outcome::new(ctx.call("light", "turn_on").with("kelvin", kelvin)).report(
                Property::new(
                    Interface::ColorTemperatureController,
                    "colorTemperatureInKelvin",
                    kelvin,
                ),
            ))
        }
        (Interface::ColorTemperatureController, "IncreaseColorTemperature") => {
            step_color_temp(light, ctx, |mireds| (mireds - MIRED_STEP).max(light.min_mireds))
        }
        (Interface::ColorTemperatureController, "DecreaseColorTemperature") => {
            step_color_temp(light, ctx, |mireds| (mireds + MIRED_STEP).min(light.max_mireds))
        }
        _ => Err(ctx.unsupported()),
    }
}

fn set_brightness(ctx: &DirectiveContext<'_>, brightness: i64) -> Outcome {
    Outcome::new(ctx.call("light", "turn_on").with("brightness_pct", brightness)).report(
        Property::new(Interface::BrightnessController, "brightness", brightness),
    )
}

fn set_color(ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let color = ctx.field("color")?;
    let hue = number_in(color, "hue")?;
    let saturation = number_in(color, "saturation")?;
    let brightness = number_in(color, "brightness")?;
    let rgb = hsb_to_rgb(hue, saturation, brightness);

    Ok(
        Outcome::new(ctx.call("light", "turn_on").with("rgb_color", Value::from(rgb.to_vec())))
            .report(Property::new(Interface::ColorController, "color", color.clone())),
    )
}

fn step_color_temp(
    light: &LightState,
    ctx: &DirectiveContext<'_>,
    step: impl Fn(f64) -> f64,
) -> Result<Outcome, DirectiveError> {
    let current = light
        .color_temp
        .ok_or_else(|| DirectiveError::invalid_value("current colour temperature is unknown"))?;
    let mireds = step(current);
    Ok(Outcome::new(ctx.call("light", "turn_on").with("color_temp", whole(mireds))).report(
        Property::new(
            Interface::ColorTemperatureController,
            "colorTemperatureInKelvin",
            whole(mired_to_kelvin(mireds)),
        ),
    ))
}
