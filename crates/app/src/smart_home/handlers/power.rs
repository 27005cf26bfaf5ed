use voicebridge_domain::entity::EntityDomain;
use voicebridge_domain::entity::view::{DomainState, MediaPlayerState};

use super::{DirectiveContext, Outcome};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::DirectiveError;
use crate::smart_home::properties::{Property, on_off};

fn turn(on: bool) -> &'static str {
    if on { "turn_on" } else { "turn_off" }
}

pub(super) fn handle(ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let on = match ctx.name() {
        "TurnOn" => true,
        "TurnOff" => false,
        _ => return Err(ctx.unsupported()),
    };

    let call = match (ctx.view.domain, &ctx.view.state) {
        (EntityDomain::Group, _) => ctx.call("homeassistant", turn(on)),
        (EntityDomain::Cover, _) => ctx.call("cover", if on { "open_cover" } else { "close_cover" }),
        (EntityDomain::MediaPlayer, DomainState::MediaPlayer(player)) => {
            let flag = if on {
                MediaPlayerState::SUPPORT_TURN_ON
            } else {
                MediaPlayerState::SUPPORT_TURN_OFF
            };
            if player.supports(flag) {
                ctx.call("media_player", turn(on))
            } else {
                ctx.call("media_player", if on { "media_play" } else { "media_stop" })
            }
        }
        (domain, _) => ctx.call(domain.as_str(), turn(on)),
    };

    Ok(Outcome::new(call).report(Property::new(
        Interface::PowerController,
        "powerState",
        on_off(on),
    )))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use voicebridge_domain::temperature::TemperatureUnit;

    use crate::smart_home::handlers::test_support::{reported, run, view};

    fn service(entity_id: &str, attrs: serde_json::Value, name: &str) -> String {
        let view = view(entity_id, "off", attrs);
        run(&view, "Alexa.PowerController", name, None, json!({}), TemperatureUnit::Celsius)
            .unwrap()
            .call
            .to_string()
    }

    #[test]
    fn should_call_domain_turn_on_and_report_power_state() {
        let view = view("switch.test", "off", json!({}));
        let outcome = run(&view, "Alexa.PowerController", "TurnOn", None, json!({}), TemperatureUnit::Celsius).unwrap();
        assert_eq!(outcome.call.to_string(), "switch.turn_on");
        assert_eq!(outcome.call.target(), Some("switch.test"));
        assert_eq!(reported(&outcome, "powerState"), "ON");
    }

    #[test]
    fn should_route_groups_through_generic_services() {
        assert_eq!(service("group.test", json!({}), "TurnOn"), "homeassistant.turn_on");
        assert_eq!(service("group.test", json!({}), "TurnOff"), "homeassistant.turn_off");
    }

    #[test]
    fn should_open_and_close_covers() {
        assert_eq!(service("cover.test", json!({}), "TurnOn"), "cover.open_cover");
        assert_eq!(service("cover.test", json!({}), "TurnOff"), "cover.close_cover");
    }

    #[test]
    fn should_map_media_player_power_to_playback_without_power_support() {
        let attrs = json!({"supported_features": 0xFA3F});
        assert_eq!(service("media_player.test", attrs.clone(), "TurnOn"), "media_player.media_play");
        assert_eq!(service("media_player.test", attrs, "TurnOff"), "media_player.media_stop");

        let attrs = json!({"supported_features": 128 | 256});
        assert_eq!(service("media_player.test", attrs, "TurnOn"), "media_player.turn_on");
    }
}
