//! Directive handlers.
//!
//! A handler validates the payload against the entity's typed state and
//! plans exactly one hub service call, together with the property values
//! the entity will report once that call has run. Handlers never touch the
//! store themselves; the dispatcher executes the plan.

mod cover;
mod fan;
mod lighting;
mod lock;
mod media;
mod power;
mod scene;
mod security;
mod thermostat;

use serde_json::Value;

use voicebridge_domain::entity::EntityId;
use voicebridge_domain::entity::view::{DomainState, EntityView};
use voicebridge_domain::service::ServiceCall;
use voicebridge_domain::temperature::TemperatureUnit;

use super::capabilities::Interface;
use super::error::{DirectiveError, ErrorType};
use super::message::Directive;
use super::properties::Property;

/// What a handler wants done.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Outcome {
    pub call: ServiceCall,
    pub properties: Vec<Property>,
    /// `(namespace, name, payload)` replacing the default `Alexa/Response`.
    pub response: Option<(&'static str, &'static str, Value)>,
}

impl Outcome {
    fn new(call: ServiceCall) -> Self {
        Self {
            call,
            properties: Vec::new(),
            response: None,
        }
    }

    fn report(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    fn respond_as(mut self, namespace: &'static str, name: &'static str, payload: Value) -> Self {
        self.response = Some((namespace, name, payload));
        self
    }
}

/// Everything a handler may look at.
pub(crate) struct DirectiveContext<'a> {
    pub directive: &'a Directive,
    pub view: &'a EntityView,
    /// Unit the hub stores climate temperatures in.
    pub hub_unit: TemperatureUnit,
}

impl DirectiveContext<'_> {
    fn name(&self) -> &str {
        self.directive.name()
    }

    fn entity_id(&self) -> &EntityId {
        &self.view.entity_id
    }

    /// A service call targeting this entity.
    fn call(&self, domain: &str, service: &str) -> ServiceCall {
        ServiceCall::for_entity(domain, service, self.entity_id())
    }

    fn unsupported(&self) -> DirectiveError {
        DirectiveError::invalid_directive(format!(
            "{}.{} is not supported by {}",
            self.directive.namespace(),
            self.directive.name(),
            self.entity_id()
        ))
    }

    fn field(&self, key: &str) -> Result<&Value, DirectiveError> {
        self.directive
            .field(key)
            .ok_or_else(|| missing(key))
    }

    /// Numeric payload field; numeric strings are accepted.
    fn number(&self, key: &str) -> Result<f64, DirectiveError> {
        self.field(key).and_then(|value| as_number(value).ok_or_else(|| missing(key)))
    }

    fn flag(&self, key: &str) -> Result<bool, DirectiveError> {
        self.field(key)
            .and_then(|value| value.as_bool().ok_or_else(|| missing(key)))
    }

    fn text(&self, key: &str) -> Result<&str, DirectiveError> {
        self.field(key)
            .and_then(|value| value.as_str().ok_or_else(|| missing(key)))
    }
}

fn missing(key: &str) -> DirectiveError {
    DirectiveError::invalid_directive(format!("missing or invalid payload field `{key}`"))
}

fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str()?.trim().parse().ok())
}

/// Numeric field of a nested payload object.
fn number_in(value: &Value, key: &str) -> Result<f64, DirectiveError> {
    value.get(key).and_then(as_number).ok_or_else(|| missing(key))
}

fn value_out_of_range(value: i64, minimum: i64, maximum: i64) -> DirectiveError {
    DirectiveError::new(
        ErrorType::ValueOutOfRange,
        format!("value {value} is outside {minimum}..={maximum}"),
    )
    .with_valid_range(Value::from(minimum), Value::from(maximum))
}

/// Plan the service call for a directive already matched to one of the
/// entity's capabilities.
pub(crate) fn plan(interface: Interface, ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    use Interface as I;

    match (interface, &ctx.view.state) {
        (I::PowerController, _) => power::handle(ctx),
        (I::BrightnessController | I::ColorController | I::ColorTemperatureController, DomainState::Light(light)) => {
            lighting::handle(interface, light, ctx)
        }
        (
            I::PercentageController
            | I::PowerLevelController
            | I::RangeController
            | I::ToggleController
            | I::ModeController,
            DomainState::Fan(fan),
        ) => fan::handle(interface, fan, ctx),
        (I::PercentageController, DomainState::Cover(cover)) => cover::handle(cover, ctx),
        (I::LockController, _) => lock::handle(ctx),
        (I::ThermostatController, DomainState::Climate(climate)) => thermostat::handle(climate, ctx),
        (I::SceneController, DomainState::Activity(activity)) => scene::handle(activity, ctx),
        (I::SecurityPanelController, DomainState::AlarmPanel(panel)) => security::handle(panel, ctx),
        (
            I::Speaker | I::StepSpeaker | I::PlaybackController | I::InputController | I::ChannelController,
            DomainState::MediaPlayer(player),
        ) => media::handle(interface, player, ctx),
        _ => Err(ctx.unsupported()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::{Value, json};

    use voicebridge_domain::entity::StateRecord;
    use voicebridge_domain::entity::view::EntityView;
    use voicebridge_domain::temperature::TemperatureUnit;

    use super::{DirectiveContext, Outcome, plan};
    use crate::smart_home::capabilities::Interface;
    use crate::smart_home::error::DirectiveError;
    use crate::smart_home::message::Directive;

    pub(crate) fn view(entity_id: &str, state: &str, attrs: Value) -> EntityView {
        let mut record = StateRecord::new(entity_id.parse().unwrap(), state);
        record.attributes = serde_json::from_value(attrs).unwrap();
        EntityView::from_record(&record).unwrap()
    }

    pub(crate) fn directive(namespace: &str, name: &str, instance: Option<&str>, payload: Value) -> Directive {
        let mut header = json!({
            "namespace": namespace,
            "name": name,
            "messageId": "message-1",
            "payloadVersion": "3",
        });
        if let Some(instance) = instance {
            header["instance"] = json!(instance);
        }
        Directive::from_value(json!({
            "directive": {
                "header": header,
                "endpoint": {"endpointId": "unused#unused"},
                "payload": payload,
            }
        }))
        .unwrap()
    }

    pub(crate) fn run(
        view: &EntityView,
        namespace: &str,
        name: &str,
        instance: Option<&str>,
        payload: Value,
        hub_unit: TemperatureUnit,
    ) -> Result<Outcome, DirectiveError> {
        let directive = directive(namespace, name, instance, payload);
        let interface = Interface::from_namespace(namespace).unwrap();
        plan(
            interface,
            &DirectiveContext {
                directive: &directive,
                view,
                hub_unit,
            },
        )
    }

    pub(crate) fn reported<'a>(outcome: &'a Outcome, name: &str) -> &'a Value {
        &outcome
            .properties
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("property {name} not reported"))
            .value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_accept_numeric_strings() {
        assert_eq!(as_number(&json!("50")), Some(50.0));
        assert_eq!(as_number(&json!(-5)), Some(-5.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn should_attach_valid_range_to_out_of_range_error() {
        let err = value_out_of_range(120, 0, 100);
        assert_eq!(err.error_type, ErrorType::ValueOutOfRange);
        assert_eq!(
            err.payload()["validRange"],
            json!({"minimumValue": 0, "maximumValue": 100})
        );
    }
}
