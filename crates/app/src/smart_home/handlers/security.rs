use serde_json::{Value, json};

use voicebridge_domain::entity::view::AlarmPanelState;
use voicebridge_domain::service::ServiceCall;

use super::{DirectiveContext, Outcome};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::{DirectiveError, ErrorType};
use crate::smart_home::properties::Property;

const DOMAIN: &str = "alarm_control_panel";

pub(super) fn handle(panel: &AlarmPanelState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    match ctx.name() {
        "Arm" => arm(panel, ctx),
        "Disarm" => {
            let call = with_code(ctx.call(DOMAIN, "alarm_disarm"), ctx);
            Ok(Outcome::new(call).report(arm_state("DISARMED")))
        }
        _ => Err(ctx.unsupported()),
    }
}

fn arm(panel: &AlarmPanelState, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    // Switching between armed states needs the code, which the arm directive never carries.
    if !panel.is_disarmed() {
        return Err(DirectiveError::new(
            ErrorType::AuthorizationRequired,
            format!("{} must be disarmed before it can be armed", ctx.view.entity_id),
        ));
    }

    let requested = ctx.text("armState")?;
    let (service, reported) = match requested {
        "ARMED_AWAY" => ("alarm_arm_away", "ARMED_AWAY"),
        "ARMED_STAY" => ("alarm_arm_home", "ARMED_STAY"),
        "ARMED_NIGHT" => ("alarm_arm_night", "ARMED_NIGHT"),
        other => return Err(DirectiveError::invalid_value(format!("unsupported arm state {other:?}"))),
    };

    let call = with_code(ctx.call(DOMAIN, service), ctx);
    Ok(Outcome::new(call)
        .report(arm_state(reported))
        .respond_as(
            Interface::SecurityPanelController.namespace(),
            "Arm.Response",
            json!({"exitDelayInSeconds": 0}),
        ))
}

fn arm_state(value: &'static str) -> Property {
    Property::new(Interface::SecurityPanelController, "armState", value)
}

/// Forward `authorization.value` as the panel code when present.
fn with_code(call: ServiceCall, ctx: &DirectiveContext<'_>) -> ServiceCall {
    match ctx
        .directive
        .field("authorization")
        .and_then(|authorization| authorization.get("value"))
        .and_then(Value::as_str)
    {
        Some(code) => call.with("code", code),
        None => call,
    }
}
