//! State store port: the hub's entity table and service registry.

use std::future::Future;

use voicebridge_domain::entity::{EntityId, StateRecord};
use voicebridge_domain::error::BridgeError;
use voicebridge_domain::service::ServiceCall;

/// Read/write access to the hub that owns entities and services.
///
/// The bridge reads current state, issues at most one service call per
/// directive and never caches what it reads.
pub trait StateStore {
    /// Current record for one entity, `None` when the hub does not know it.
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<StateRecord>, BridgeError>> + Send;

    /// Insert or replace a record.
    fn set_state(&self, record: StateRecord) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Every record, in the store's iteration order.
    fn all_states(&self) -> impl Future<Output = Result<Vec<StateRecord>, BridgeError>> + Send;

    /// Run `<domain>.<service>` and wait for it to complete.
    fn call_service(&self, call: ServiceCall) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: StateStore + Send + Sync> StateStore for std::sync::Arc<T> {
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<StateRecord>, BridgeError>> + Send {
        (**self).get_state(entity_id)
    }

    fn set_state(&self, record: StateRecord) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).set_state(record)
    }

    fn all_states(&self) -> impl Future<Output = Result<Vec<StateRecord>, BridgeError>> + Send {
        (**self).all_states()
    }

    fn call_service(&self, call: ServiceCall) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).call_service(call)
    }
}
