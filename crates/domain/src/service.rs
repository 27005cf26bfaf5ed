//! Service: a callable hub command such as `light.turn_on`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::EntityId;

/// A request for the hub to run `<domain>.<service>` with some data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ServiceCall {
    /// A call targeting one entity (`data.entity_id` is set).
    pub fn for_entity(
        domain: impl Into<String>,
        service: impl Into<String>,
        entity_id: &EntityId,
    ) -> Self {
        let mut data = Map::new();
        data.insert("entity_id".to_string(), Value::from(entity_id.as_str()));
        Self {
            domain: domain.into(),
            service: service.into(),
            data,
        }
    }

    /// Builder-style data setter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Entity the call targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.data.get("entity_id").and_then(Value::as_str)
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.service)
    }
}
