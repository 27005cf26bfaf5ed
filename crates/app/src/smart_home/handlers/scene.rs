use serde_json::json;

use voicebridge_domain::entity::view::ActivityState;
use voicebridge_domain::time::{now, to_protocol_string};

use super::{DirectiveContext, Outcome};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::DirectiveError;

pub(super) fn handle(activity: &ActivityState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let domain = ctx.view.domain.as_str();
    let (service, response) = match ctx.name() {
        "Activate" => ("turn_on", "ActivationStarted"),
        "Deactivate" if activity.can_cancel => ("turn_off", "DeactivationStarted"),
        _ => return Err(ctx.unsupported()),
    };
    Ok(Outcome::new(ctx.call(domain, service)).respond_as(
        Interface::SceneController.namespace(),
        response,
        json!({
            "cause": {"type": "VOICE_INTERACTION"},
            "timestamp": to_protocol_string(now()),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use voicebridge_domain::temperature::TemperatureUnit;

    use crate::smart_home::error::ErrorType;
    use crate::smart_home::handlers::test_support::{run, view};

    #[test]
    fn should_activate_scene_and_answer_activation_started() {
        let scene = view("scene.test", "off", json!({}));
        let outcome = run(&scene, "Alexa.SceneController", "Activate", None, json!({}), TemperatureUnit::Celsius).unwrap();
        assert_eq!(outcome.call.to_string(), "scene.turn_on");
        assert!(outcome.properties.is_empty());
        let (namespace, name, payload) = outcome.response.unwrap();
        assert_eq!(namespace, "Alexa.SceneController");
        assert_eq!(name, "ActivationStarted");
        assert_eq!(payload["cause"]["type"], "VOICE_INTERACTION");
        assert!(payload["timestamp"].is_string());
    }

    #[test]
    fn should_deactivate_only_cancelable_scripts() {
        let script = view("script.test_2", "off", json!({"can_cancel": true}));
        let outcome = run(&script, "Alexa.SceneController", "Deactivate", None, json!({}), TemperatureUnit::Celsius).unwrap();
        assert_eq!(outcome.call.to_string(), "script.turn_off");
        assert_eq!(outcome.response.unwrap().1, "DeactivationStarted");

        let script = view("script.test", "off", json!({}));
        let err = run(&script, "Alexa.SceneController", "Deactivate", None, json!({}), TemperatureUnit::Celsius).unwrap_err();
        assert_eq!(err.error_type, ErrorType::InvalidDirective);
    }
}
