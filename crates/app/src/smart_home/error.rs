//! Directive error taxonomy.

use std::fmt;

use serde_json::{Map, Value, json};

/// Error codes carried in the `type` field of an `ErrorResponse` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    NoSuchEndpoint,
    InvalidDirective,
    InternalError,
    BridgeUnreachable,
    TemperatureValueOutOfRange,
    UnsupportedThermostatMode,
    AuthorizationRequired,
    ValueOutOfRange,
    InvalidValue,
}

impl ErrorType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSuchEndpoint => "NO_SUCH_ENDPOINT",
            Self::InvalidDirective => "INVALID_DIRECTIVE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::BridgeUnreachable => "BRIDGE_UNREACHABLE",
            Self::TemperatureValueOutOfRange => "TEMPERATURE_VALUE_OUT_OF_RANGE",
            Self::UnsupportedThermostatMode => "UNSUPPORTED_THERMOSTAT_MODE",
            Self::AuthorizationRequired => "AUTHORIZATION_REQUIRED",
            Self::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            Self::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directive that could not be carried out.
///
/// Always recovered into an `Alexa/ErrorResponse` envelope; never escapes
/// the dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error_type}: {message}")]
pub struct DirectiveError {
    pub error_type: ErrorType,
    pub message: String,
    /// Extra payload fields, e.g. `validRange`.
    pub extra: Map<String, Value>,
}

impl DirectiveError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            extra: Map::new(),
        }
    }

    pub fn invalid_directive(message: impl Into<String>) -> Self {
        Self::new(ErrorType::InvalidDirective, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorType::InvalidValue, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorType::InternalError, message)
    }

    pub fn no_such_endpoint(message: impl Into<String>) -> Self {
        Self::new(ErrorType::NoSuchEndpoint, message)
    }

    /// Attach the accepted bounds.
    #[must_use]
    pub fn with_valid_range(mut self, minimum: Value, maximum: Value) -> Self {
        self.extra.insert(
            "validRange".to_string(),
            json!({"minimumValue": minimum, "maximumValue": maximum}),
        );
        self
    }

    /// `{"type", "message", ...extra}`
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut payload = self.extra.clone();
        payload.insert("type".to_string(), Value::from(self.error_type.as_str()));
        payload.insert("message".to_string(), Value::from(self.message.as_str()));
        Value::Object(payload)
    }
}

/// A request that does not follow the protocol at all.
///
/// This is the only error that escapes
/// [`SmartHome::handle_message`](super::SmartHome::handle_message).
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed directive")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported payload version {0:?}, expected \"3\"")]
    UnsupportedVersion(String),
}
