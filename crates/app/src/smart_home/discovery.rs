//! Discovery: every exposed entity becomes one endpoint descriptor.

use serde_json::{Value, json};

use voicebridge_domain::entity::view::EntityView;
use voicebridge_domain::entity::{EntityDomain, EntityId, StateRecord};
use voicebridge_domain::filter::is_never_exposed;

use super::capabilities::{Capability, capabilities_for};
use super::endpoint::{DisplayCategory, endpoint_id, sanitize_name};
use crate::ports::{EntityOverrides, ExposurePolicy};

/// The never-expose list always wins over the policy.
pub(crate) fn is_exposed(policy: &impl ExposurePolicy, entity_id: &EntityId) -> bool {
    !is_never_exposed(entity_id) && policy.should_expose(entity_id)
}

/// Endpoints for every exposed, representable record, in store order.
///
/// Entities that cannot be classified are skipped, never reported as errors.
pub(crate) fn discover(
    records: &[StateRecord],
    policy: &impl ExposurePolicy,
    product_name: &str,
) -> Vec<Value> {
    records
        .iter()
        .filter(|record| is_exposed(policy, &record.entity_id))
        .filter_map(|record| {
            let view = match EntityView::from_record(record) {
                Ok(view) => view,
                Err(err) => {
                    tracing::debug!(entity_id = %record.entity_id, error = %err, "skipping entity");
                    return None;
                }
            };
            let capabilities = capabilities_for(&view);
            if capabilities.is_empty() {
                tracing::debug!(entity_id = %record.entity_id, "no capabilities, skipping entity");
                return None;
            }
            let overrides = policy.entity_config(&record.entity_id);
            Some(endpoint_descriptor(&view, &capabilities, overrides, product_name))
        })
        .collect()
}

fn endpoint_descriptor(
    view: &EntityView,
    capabilities: &[Capability],
    overrides: Option<&EntityOverrides>,
    product_name: &str,
) -> Value {
    let name = overrides
        .and_then(|o| o.name.as_deref())
        .unwrap_or(&view.friendly_name);
    let description = overrides
        .and_then(|o| o.description.as_deref())
        .unwrap_or(&view.friendly_name);

    let mut description = sanitize_name(&format!("{description} via {product_name}"));
    if matches!(view.domain, EntityDomain::Scene | EntityDomain::Script) {
        description.push_str(" (Scene)");
    }

    let category = overrides
        .and_then(|o| o.display_categories.clone())
        .unwrap_or_else(|| DisplayCategory::for_entity(view).to_string());

    json!({
        "endpointId": endpoint_id(&view.entity_id),
        "friendlyName": sanitize_name(name),
        "description": description,
        "manufacturerName": product_name,
        "displayCategories": [category],
        "capabilities": capabilities.iter().map(Capability::to_json).collect::<Vec<_>>(),
    })
}
