//! Voice-assistant smart-home bridge.
//!
//! Translates directives of the external device-capability protocol
//! (payload version 3) into hub service calls, and hub entities into
//! discoverable endpoints.
//!
//! ```text
//! request JSON ─▶ Directive ─▶ SmartHome::dispatch ─┬─▶ discovery ─▶ endpoints
//!                                                   └─▶ handlers  ─▶ ServiceCall
//!                                       Response ◀──────────┘
//! ```

mod capabilities;
mod config;
mod discovery;
mod dispatcher;
mod endpoint;
mod error;
mod handlers;
mod message;
mod properties;

pub use capabilities::{Capability, Interface, capabilities_for};
pub use config::BridgeConfig;
pub use dispatcher::SmartHome;
pub use endpoint::{DisplayCategory, endpoint_id, entity_id_from_endpoint, sanitize_name};
pub use error::{DirectiveError, ErrorType, ProtocolError};
pub use message::{Directive, Header, PAYLOAD_VERSION, Response};
pub use properties::Property;
