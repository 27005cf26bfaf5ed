//! Inbound directive parsing and outbound envelope building.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use voicebridge_domain::entity::EntityId;
use voicebridge_domain::id::MessageId;
use voicebridge_domain::time::{now, to_protocol_string};

use super::endpoint::entity_id_from_endpoint;
use super::error::{DirectiveError, ProtocolError};
use super::properties::Property;

/// The only payload version this bridge speaks.
pub const PAYLOAD_VERSION: &str = "3";

const ALEXA: &str = "Alexa";
const RESPONSE: &str = "Response";
const ERROR_RESPONSE: &str = "ErrorResponse";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
    pub payload_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

#[derive(Deserialize)]
struct RequestEnvelope {
    directive: RawDirective,
}

#[derive(Deserialize)]
struct RawDirective {
    header: Header,
    #[serde(default)]
    endpoint: Option<Value>,
    #[serde(default)]
    payload: Option<Value>,
}

/// One inbound request, consumed by exactly one handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub header: Header,
    /// Kept verbatim so it can be echoed back.
    pub endpoint: Option<Value>,
    /// Always a JSON object.
    pub payload: Value,
}

impl Directive {
    /// Parse a raw `{"directive": ...}` request.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] when the envelope does not have
    /// the expected shape and [`ProtocolError::UnsupportedVersion`] when the
    /// payload version is not [`PAYLOAD_VERSION`].
    pub fn from_value(request: Value) -> Result<Self, ProtocolError> {
        let RequestEnvelope { directive } = serde_json::from_value(request)?;
        if directive.header.payload_version != PAYLOAD_VERSION {
            return Err(ProtocolError::UnsupportedVersion(
                directive.header.payload_version,
            ));
        }
        Ok(Self {
            header: directive.header,
            endpoint: directive.endpoint,
            payload: directive
                .payload
                .filter(Value::is_object)
                .unwrap_or_else(|| Value::Object(Map::new())),
        })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.header.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.header.name
    }

    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.header.instance.as_deref()
    }

    #[must_use]
    pub fn endpoint_id(&self) -> Option<&str> {
        self.endpoint.as_ref()?.get("endpointId")?.as_str()
    }

    /// Hub entity targeted by this directive, when the endpoint id decodes.
    #[must_use]
    pub fn entity_id(&self) -> Option<EntityId> {
        entity_id_from_endpoint(self.endpoint_id()?).ok()
    }

    /// A payload field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Default `Alexa/Response` for this directive: correlation token and
    /// endpoint are carried over, payload is empty.
    #[must_use]
    pub fn response(&self) -> Response {
        Response {
            namespace: ALEXA.to_string(),
            name: RESPONSE.to_string(),
            correlation_token: self.header.correlation_token.clone(),
            endpoint: self.endpoint.clone(),
            payload: Value::Object(Map::new()),
            properties: Vec::new(),
        }
    }

    /// `Alexa/ErrorResponse` carrying the error's type and message.
    #[must_use]
    pub fn error_response(&self, error: &DirectiveError) -> Response {
        self.response()
            .named(ALEXA, ERROR_RESPONSE)
            .with_payload(error.payload())
    }
}

/// An outbound response under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    namespace: String,
    name: String,
    correlation_token: Option<String>,
    endpoint: Option<Value>,
    payload: Value,
    properties: Vec<Property>,
}

impl Response {
    #[must_use]
    pub fn named(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Report property values in `context.properties`.
    #[must_use]
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.namespace == ALEXA && self.name == ERROR_RESPONSE
    }

    /// Serialise into the wire envelope with a freshly generated message id.
    #[must_use]
    pub fn into_json(self) -> Value {
        let mut header = Map::new();
        header.insert("namespace".to_string(), Value::from(self.namespace));
        header.insert("name".to_string(), Value::from(self.name));
        header.insert(
            "messageId".to_string(),
            Value::from(MessageId::new().to_string()),
        );
        if let Some(token) = self.correlation_token {
            header.insert("correlationToken".to_string(), Value::from(token));
        }
        header.insert("payloadVersion".to_string(), Value::from(PAYLOAD_VERSION));

        let mut event = Map::new();
        event.insert("header".to_string(), Value::Object(header));
        if let Some(endpoint) = self.endpoint {
            event.insert("endpoint".to_string(), endpoint);
        }
        event.insert("payload".to_string(), self.payload);

        let mut message = Map::new();
        message.insert("event".to_string(), Value::Object(event));
        if !self.properties.is_empty() {
            let time_of_sample = to_protocol_string(now());
            let properties = self
                .properties
                .iter()
                .map(|property| property.to_json(&time_of_sample))
                .collect::<Vec<_>>();
            message.insert(
                "context".to_string(),
                serde_json::json!({ "properties": properties }),
            );
        }
        Value::Object(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart_home::capabilities::Interface;
    use crate::smart_home::error::ErrorType;
    use serde_json::json;

    fn request(namespace: &str, name: &str, endpoint: Option<&str>) -> Value {
        let mut directive = json!({
            "header": {
                "namespace": namespace,
                "name": name,
                "messageId": "5f8a426e-01e4-4cc9-8b79-65f8bd0fd8a4",
                "correlationToken": "dFMb0z+PgpgdDmluhJ1LddFvSqZ/jCc8ptlAKulUj90jSqg==",
                "payloadVersion": "3",
            },
            "payload": {},
        });
        if let Some(endpoint_id) = endpoint {
            directive["endpoint"] = json!({
                "endpointId": endpoint_id,
                "scope": {"type": "BearerToken", "token": "token"},
            });
        }
        json!({ "directive": directive })
    }

    #[test]
    fn should_build_default_response_when_only_payload_given() {
        let raw = request("Alexa.PowerController", "TurnOn", Some("switch#xy"));
        let directive = Directive::from_value(raw.clone()).unwrap();

        let msg = directive
            .response()
            .with_payload(json!({"test": 3}))
            .into_json();
        let event = &msg["event"];

        assert!(event["header"]["messageId"].is_string());
        assert_ne!(event["header"]["messageId"], raw["directive"]["header"]["messageId"]);
        assert_eq!(
            event["header"]["correlationToken"],
            raw["directive"]["header"]["correlationToken"]
        );
        assert_eq!(event["header"]["name"], "Response");
        assert_eq!(event["header"]["namespace"], "Alexa");
        assert_eq!(event["header"]["payloadVersion"], "3");
        assert_eq!(event["payload"]["test"], 3);
        assert_eq!(event["endpoint"], raw["directive"]["endpoint"]);
        assert!(msg.get("context").is_none());
    }

    #[test]
    fn should_keep_echoed_endpoint_independent_from_directive() {
        let directive =
            Directive::from_value(request("Alexa.PowerController", "TurnOn", Some("switch#xy"))).unwrap();
        let mut msg = directive.response().into_json();
        msg["event"]["endpoint"]["endpointId"] = json!("switch#changed");
        assert_eq!(directive.endpoint_id(), Some("switch#xy"));
    }

    #[test]
    fn should_omit_correlation_token_and_endpoint_when_absent() {
        let mut raw = request("Alexa.PowerController", "TurnOn", None);
        raw["directive"]["header"]
            .as_object_mut()
            .unwrap()
            .remove("correlationToken");
        let directive = Directive::from_value(raw).unwrap();

        let msg = directive.response().named("testNameSpace", "testName").into_json();
        let event = &msg["event"];

        assert!(event["header"].get("correlationToken").is_none());
        assert_eq!(event["header"]["name"], "testName");
        assert_eq!(event["header"]["namespace"], "testNameSpace");
        assert_eq!(event["payload"], json!({}));
        assert!(event.get("endpoint").is_none());
    }

    #[test]
    fn should_reject_wrong_payload_version() {
        let mut raw = request("Alexa.PowerController", "TurnOn", None);
        raw["directive"]["header"]["payloadVersion"] = json!("2");
        assert!(matches!(
            Directive::from_value(raw),
            Err(ProtocolError::UnsupportedVersion(version)) if version == "2"
        ));
    }

    #[test]
    fn should_reject_request_without_directive() {
        assert!(matches!(
            Directive::from_value(json!({"event": {}})),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn should_decode_entity_id_from_endpoint() {
        let directive =
            Directive::from_value(request("Alexa.PowerController", "TurnOn", Some("light#test_1"))).unwrap();
        assert_eq!(directive.entity_id().unwrap().as_str(), "light.test_1");
    }

    #[test]
    fn should_build_error_envelope_with_endpoint_echo() {
        let directive =
            Directive::from_value(request("Alexa.PowerController", "TurnOn", Some("switch#xy"))).unwrap();
        let error = DirectiveError::new(ErrorType::NoSuchEndpoint, "missing");
        let response = directive.error_response(&error);
        assert!(response.is_error());

        let msg = response.into_json();
        assert_eq!(msg["event"]["header"]["namespace"], "Alexa");
        assert_eq!(msg["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(msg["event"]["payload"]["type"], "NO_SUCH_ENDPOINT");
        assert_eq!(msg["event"]["endpoint"]["endpointId"], "switch#xy");
    }

    #[test]
    fn should_stamp_context_properties() {
        let directive =
            Directive::from_value(request("Alexa.PowerController", "TurnOn", Some("switch#xy"))).unwrap();
        let msg = directive
            .response()
            .with_properties([Property::new(Interface::PowerController, "powerState", "ON")])
            .into_json();
        let property = &msg["context"]["properties"][0];
        assert_eq!(property["namespace"], "Alexa.PowerController");
        assert_eq!(property["name"], "powerState");
        assert_eq!(property["value"], "ON");
        assert_eq!(property["uncertaintyInMilliseconds"], 0);
        assert!(property["timeOfSample"].as_str().unwrap().ends_with('Z'));
    }
}
