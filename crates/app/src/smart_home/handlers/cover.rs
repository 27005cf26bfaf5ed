use voicebridge_domain::entity::view::CoverState;

use super::{DirectiveContext, Outcome, value_out_of_range};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::DirectiveError;
use crate::smart_home::properties::{Property, whole};

pub(super) fn handle(cover: &CoverState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let position = match ctx.name() {
        "SetPercentage" => {
            let position = whole(ctx.number("percentage")?);
            if !(0..=100).contains(&position) {
                return Err(value_out_of_range(position, 0, 100));
            }
            position
        }
        "AdjustPercentage" => {
            let current = cover.position.map_or(0, whole);
            (current + whole(ctx.number("percentageDelta")?)).clamp(0, 100)
        }
        _ => return Err(ctx.unsupported()),
    };
    Ok(Outcome::new(ctx.call("cover", "set_cover_position").with("position", position))
        .report(Property::new(Interface::PercentageController, "percentage", position)))
}
