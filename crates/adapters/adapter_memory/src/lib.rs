//! # voicebridge-adapter-memory
//!
//! In-memory implementation of the [`StateStore`] port.
//!
//! Records are kept in insertion order so discovery lists endpoints the way
//! they were seeded. Every service call is recorded; calls can be made to
//! fail per `<domain>.<service>`, and a small set of well-known services can
//! optionally be applied to the stored state.
//!
//! ## Dependency rule
//!
//! Depends on `voicebridge-app` (port traits) and `voicebridge-domain` only.

mod effects;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use voicebridge_app::ports::StateStore;
use voicebridge_domain::entity::{EntityId, StateRecord};
use voicebridge_domain::error::{BridgeError, ServiceError};
use voicebridge_domain::service::ServiceCall;

/// Errors raised while seeding the store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("invalid state seed")]
    Seed(#[from] serde_json::Error),
}

impl From<MemoryStoreError> for BridgeError {
    fn from(err: MemoryStoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Hub state held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    records: Mutex<Vec<StateRecord>>,
    calls: Mutex<Vec<ServiceCall>>,
    failing: Mutex<HashSet<(String, String)>>,
    apply_effects: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStateStore {
    /// A store seeded with `records`, in order.
    #[must_use]
    pub fn with_states(records: impl IntoIterator<Item = StateRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
            ..Self::default()
        }
    }

    /// A store seeded from a JSON array of state records.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryStoreError::Seed`] when the document is not an array
    /// of valid records.
    pub fn from_json(document: &str) -> Result<Self, MemoryStoreError> {
        let records: Vec<StateRecord> = serde_json::from_str(document)?;
        Ok(Self::with_states(records))
    }

    /// Apply well-known services (`turn_on`, `lock`, `set_speed`, …) to the
    /// stored state instead of only recording them.
    #[must_use]
    pub fn with_effects(mut self) -> Self {
        self.apply_effects = true;
        self
    }

    /// Make every later call to `<domain>.<service>` fail.
    pub fn fail_service(&self, domain: &str, service: &str) {
        lock(&self.failing).insert((domain.to_string(), service.to_string()));
    }

    /// Every successful service call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.calls).clone()
    }

    /// Successful calls to `<domain>.<service>`.
    #[must_use]
    pub fn calls_to(&self, domain: &str, service: &str) -> Vec<ServiceCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.domain == domain && call.service == service)
            .cloned()
            .collect()
    }

    fn is_failing(&self, call: &ServiceCall) -> bool {
        lock(&self.failing).contains(&(call.domain.clone(), call.service.clone()))
    }

    fn upsert(&self, record: StateRecord) {
        let mut records = lock(&self.records);
        match records
            .iter_mut()
            .find(|existing| existing.entity_id == record.entity_id)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    fn run(&self, call: ServiceCall) -> Result<(), BridgeError> {
        if self.is_failing(&call) {
            tracing::debug!(service = %call, "injected service failure");
            return Err(ServiceError::Failed {
                domain: call.domain,
                service: call.service,
                reason: "service failure injected".to_string(),
            }
            .into());
        }

        if self.apply_effects {
            let target = call.target().and_then(|id| id.parse::<EntityId>().ok());
            if let Some(entity_id) = target {
                let mut records = lock(&self.records);
                if let Some(record) = records
                    .iter_mut()
                    .find(|record| record.entity_id == entity_id)
                {
                    effects::apply(record, &call);
                }
            }
        }

        tracing::debug!(service = %call, entity_id = call.target(), "service called");
        lock(&self.calls).push(call);
        Ok(())
    }
}

impl StateStore for InMemoryStateStore {
    fn get_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<StateRecord>, BridgeError>> + Send {
        let found = lock(&self.records)
            .iter()
            .find(|record| &record.entity_id == entity_id)
            .cloned();
        async { Ok(found) }
    }

    fn set_state(&self, record: StateRecord) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.upsert(record);
        async { Ok(()) }
    }

    fn all_states(&self) -> impl Future<Output = Result<Vec<StateRecord>, BridgeError>> + Send {
        let records = lock(&self.records).clone();
        async { Ok(records) }
    }

    fn call_service(&self, call: ServiceCall) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.run(call);
        async { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entity_id: &str, state: &str) -> StateRecord {
        StateRecord::new(entity_id.parse().unwrap(), state)
    }

    fn entity(id: &str) -> EntityId {
        id.parse().unwrap()
    }

    #[tokio::test]
    async fn should_keep_insertion_order() {
        let store = InMemoryStateStore::with_states([
            record("switch.b", "on"),
            record("light.a", "off"),
        ]);
        store.set_state(record("fan.c", "off")).await.unwrap();

        let ids: Vec<String> = store
            .all_states()
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.entity_id.to_string())
            .collect();
        assert_eq!(ids, vec!["switch.b", "light.a", "fan.c"]);
    }

    #[tokio::test]
    async fn should_replace_existing_record_in_place() {
        let store = InMemoryStateStore::with_states([record("switch.a", "off"), record("switch.b", "off")]);
        store.set_state(record("switch.a", "on")).await.unwrap();

        let states = store.all_states().await.unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].state, "on");
    }

    #[tokio::test]
    async fn should_return_none_when_entity_is_unknown() {
        let store = InMemoryStateStore::default();
        assert!(store.get_state(&entity("switch.nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_record_calls_without_touching_state_by_default() {
        let store = InMemoryStateStore::with_states([record("switch.a", "off")]);
        let call = ServiceCall::for_entity("switch", "turn_on", &entity("switch.a"));
        store.call_service(call.clone()).await.unwrap();

        assert_eq!(store.calls(), vec![call]);
        assert_eq!(store.calls_to("switch", "turn_on").len(), 1);
        let current = store.get_state(&entity("switch.a")).await.unwrap().unwrap();
        assert_eq!(current.state, "off");
    }

    #[tokio::test]
    async fn should_apply_effects_when_enabled() {
        let store = InMemoryStateStore::with_states([record("switch.a", "off")]).with_effects();
        store
            .call_service(ServiceCall::for_entity("switch", "turn_on", &entity("switch.a")))
            .await
            .unwrap();
        let current = store.get_state(&entity("switch.a")).await.unwrap().unwrap();
        assert_eq!(current.state, "on");
    }

    #[tokio::test]
    async fn should_fail_injected_service_and_not_record_it() {
        let store = InMemoryStateStore::with_states([record("switch.a", "off")]);
        store.fail_service("switch", "turn_on");

        let result = store
            .call_service(ServiceCall::for_entity("switch", "turn_on", &entity("switch.a")))
            .await;
        assert!(matches!(
            result,
            Err(BridgeError::Service(ServiceError::Failed { .. }))
        ));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn should_seed_from_json_array() {
        let store = InMemoryStateStore::from_json(
            r#"[{"entity_id": "light.kitchen", "state": "on", "attributes": {"brightness": 128}}]"#,
        )
        .unwrap();
        let records = lock(&store.records);
        assert_eq!(records[0].entity_id.as_str(), "light.kitchen");
        assert_eq!(records[0].attributes.get_f64("brightness"), Some(128.0));
    }

    #[test]
    fn should_reject_invalid_seed() {
        let err = InMemoryStateStore::from_json(r#"[{"entity_id": "not-an-id", "state": "on"}]"#).unwrap_err();
        assert!(matches!(err, MemoryStoreError::Seed(_)));
        assert!(matches!(BridgeError::from(err), BridgeError::Storage(_)));
    }
}
