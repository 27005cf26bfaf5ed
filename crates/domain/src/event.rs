//! Event: an immutable record of something that happened.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::id::{ContextId, EventId};
use crate::time::{Timestamp, now};

/// Discriminates the kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A smart-home directive was handled (success or error).
    #[serde(rename = "alexa_smart_home")]
    SmartHome,
}

/// An observable record published on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub context: ContextId,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event with a fresh id and context, stamped now.
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            context: ContextId::new(),
            timestamp: now(),
        }
    }

    /// Attach the causation context of the request that produced this event.
    #[must_use]
    pub fn with_context(mut self, context: ContextId) -> Self {
        self.context = context;
        self
    }
}
