use serde_json::Value;

use voicebridge_domain::entity::view::MediaPlayerState;

use super::{DirectiveContext, Outcome, value_out_of_range};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::{DirectiveError, ErrorType};
use crate::smart_home::properties::{Property, whole};

const DOMAIN: &str = "media_player";

/// Channel identifiers in lookup order.
const CHANNEL_KEYS: [&str; 4] = ["number", "callSign", "affiliateCallSign", "uri"];

pub(super) fn handle(
    interface: Interface,
    player: &MediaPlayerState,
    ctx: &DirectiveContext<'_>,
) -> Result<Outcome, DirectiveError> {
    match (interface, ctx.name()) {
        (Interface::Speaker, "SetVolume") => {
            let volume = whole(ctx.number("volume")?);
            if !(0..=100).contains(&volume) {
                return Err(value_out_of_range(volume, 0, 100));
            }
            Ok(set_volume(ctx, volume))
        }
        (Interface::Speaker, "AdjustVolume") => {
            let current = player.volume_level.map_or(0, |level| whole(level * 100.0));
            let volume = (current + whole(ctx.number("volume")?)).clamp(0, 100);
            Ok(set_volume(ctx, volume))
        }
        (Interface::Speaker | Interface::StepSpeaker, "SetMute") => {
            let mute = ctx.flag("mute")?;
            let outcome = Outcome::new(ctx.call(DOMAIN, "volume_mute").with("is_volume_muted", mute));
            Ok(if interface == Interface::Speaker {
                outcome.report(Property::new(Interface::Speaker, "muted", mute))
            } else {
                outcome
            })
        }
        (Interface::StepSpeaker, "AdjustVolume") => {
            let steps = ctx.number("volumeSteps")?;
            let service = if steps < 0.0 {
                "volume_down"
            } else if steps > 0.0 {
                "volume_up"
            } else {
                return Err(DirectiveError::new(
                    ErrorType::ValueOutOfRange,
                    "volumeSteps must not be zero",
                ));
            };
            Ok(Outcome::new(ctx.call(DOMAIN, service)))
        }
        (Interface::PlaybackController, name) => {
            let service = match name {
                "Play" => "media_play",
                "Pause" => "media_pause",
                "Stop" => "media_stop",
                "Next" => "media_next_track",
                "Previous" => "media_previous_track",
                _ => return Err(ctx.unsupported()),
            };
            Ok(Outcome::new(ctx.call(DOMAIN, service)))
        }
        (Interface::InputController, "SelectInput") => {
            let input = ctx.text("input")?;
            let source = select_source(&player.source_list, input).ok_or_else(|| {
                DirectiveError::invalid_value(format!("{input:?} is not a known input"))
            })?;
            Ok(Outcome::new(ctx.call(DOMAIN, "select_source").with("source", source)))
        }
        (Interface::ChannelController, "ChangeChannel") => {
            let channel = channel_id(ctx)
                .ok_or_else(|| DirectiveError::invalid_value("no channel identifier in request"))?;
            let outcome = Outcome::new(
                ctx.call(DOMAIN, "play_media")
                    .with("media_content_id", channel)
                    .with("media_content_type", "channel"),
            );
            Ok(match ctx.directive.field("channel") {
                Some(requested) => outcome.report(Property::new(
                    Interface::ChannelController,
                    "channel",
                    requested.clone(),
                )),
                None => outcome,
            })
        }
        (Interface::ChannelController, "SkipChannels") => {
            let service = if ctx.number("channelCount")? > 0.0 {
                "media_next_track"
            } else {
                "media_previous_track"
            };
            Ok(Outcome::new(ctx.call(DOMAIN, service)))
        }
        _ => Err(ctx.unsupported()),
    }
}

fn set_volume(ctx: &DirectiveContext<'_>, volume: i64) -> Outcome {
    #[allow(clippy::cast_precision_loss)]
    let level = volume as f64 / 100.0;
    Outcome::new(ctx.call(DOMAIN, "volume_set").with("volume_level", level))
        .report(Property::new(Interface::Speaker, "volume", volume))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Source whose normalised name matches `input`. A trailing `1` on the
/// requested input is optional ("HDMI 1" selects "hdmi").
fn select_source<'a>(sources: &'a [String], input: &str) -> Option<&'a str> {
    let wanted = normalize(input);
    let without_index = wanted.strip_suffix('1');
    sources
        .iter()
        .find(|source| {
            let source = normalize(source);
            source == wanted || Some(source.as_str()) == without_index
        })
        .map(String::as_str)
}

fn channel_id(ctx: &DirectiveContext<'_>) -> Option<String> {
    let as_text = |value: &Value| match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    };
    let channel = ctx.directive.field("channel");
    CHANNEL_KEYS
        .iter()
        .find_map(|key| channel.and_then(|channel| channel.get(*key)).and_then(as_text))
        .or_else(|| {
            ctx.directive
                .field("channelMetadata")
                .and_then(|metadata| metadata.get("name"))
                .and_then(as_text)
        })
}
