//! Event bus port: publish/subscribe for observable events.

use std::future::Future;

use voicebridge_domain::error::BridgeError;
use voicebridge_domain::event::Event;

/// Publishes events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(event)
    }
}
