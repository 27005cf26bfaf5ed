//! Exposure filter: which entities the bridge is allowed to publish.

use std::collections::HashSet;

use serde::Deserialize;

use crate::entity::EntityId;

/// Entities that are never exposed, whatever the include rules say.
pub const NEVER_EXPOSED_ENTITIES: &[&str] = &["group.all_locks"];

/// Whether an entity id is on the fixed never-expose list.
#[must_use]
pub fn is_never_exposed(entity_id: &EntityId) -> bool {
    NEVER_EXPOSED_ENTITIES.contains(&entity_id.as_str())
}

/// Include/exclude rules over domains and entity ids.
///
/// Evaluation order:
/// 1. no rules at all → everything passes
/// 2. only include rules → listed entity or listed domain
/// 3. only exclude rules → neither listed entity nor listed domain
/// 4. include domains present → included entity, or included domain that
///    is not an excluded entity
/// 5. exclude domains present → included entity, or non-excluded domain
///    that is not an excluded entity
/// 6. otherwise (entity lists only) → included entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntityFilter {
    pub include_domains: HashSet<String>,
    pub include_entities: HashSet<String>,
    pub exclude_domains: HashSet<String>,
    pub exclude_entities: HashSet<String>,
}

impl EntityFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include_domains.is_empty()
            && self.include_entities.is_empty()
            && self.exclude_domains.is_empty()
            && self.exclude_entities.is_empty()
    }

    /// Apply the rules to one entity id.
    #[must_use]
    pub fn matches(&self, entity_id: &EntityId) -> bool {
        let id = entity_id.as_str();
        let domain = entity_id.domain();

        let has_includes = !self.include_domains.is_empty() || !self.include_entities.is_empty();
        let has_excludes = !self.exclude_domains.is_empty() || !self.exclude_entities.is_empty();

        let included_entity = self.include_entities.contains(id);
        let excluded_entity = self.exclude_entities.contains(id);

        match (has_includes, has_excludes) {
            (false, false) => true,
            (true, false) => included_entity || self.include_domains.contains(domain),
            (false, true) => !excluded_entity && !self.exclude_domains.contains(domain),
            (true, true) if !self.include_domains.is_empty() => {
                included_entity || (self.include_domains.contains(domain) && !excluded_entity)
            }
            (true, true) if !self.exclude_domains.is_empty() => {
                included_entity || (!self.exclude_domains.contains(domain) && !excluded_entity)
            }
            (true, true) => included_entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> EntityId {
        value.parse().unwrap()
    }

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn should_pass_everything_when_empty() {
        let filter = EntityFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&id("switch.test")));
    }

    #[test]
    fn should_apply_exclude_rules() {
        let filter = EntityFilter {
            exclude_domains: set(&["script"]),
            exclude_entities: set(&["cover.deny"]),
            ..EntityFilter::default()
        };
        assert!(filter.matches(&id("switch.test")));
        assert!(!filter.matches(&id("script.deny")));
        assert!(!filter.matches(&id("cover.deny")));
        assert!(filter.matches(&id("cover.allow")));
    }

    #[test]
    fn should_apply_include_rules() {
        let filter = EntityFilter {
            include_domains: set(&["automation", "group"]),
            include_entities: set(&["script.deny"]),
            ..EntityFilter::default()
        };
        assert!(!filter.matches(&id("switch.deny")));
        assert!(filter.matches(&id("script.deny")));
        assert!(filter.matches(&id("automation.allow")));
        assert!(filter.matches(&id("group.allow")));
    }

    #[test]
    fn should_let_excluded_entity_win_inside_included_domain() {
        let filter = EntityFilter {
            include_domains: set(&["light"]),
            exclude_entities: set(&["light.hidden"]),
            ..EntityFilter::default()
        };
        assert!(filter.matches(&id("light.kitchen")));
        assert!(!filter.matches(&id("light.hidden")));
        assert!(!filter.matches(&id("switch.kitchen")));
    }

    #[test]
    fn should_let_included_entity_win_inside_excluded_domain() {
        let filter = EntityFilter {
            include_entities: set(&["sensor.keep"]),
            exclude_domains: set(&["sensor"]),
            ..EntityFilter::default()
        };
        assert!(filter.matches(&id("sensor.keep")));
        assert!(!filter.matches(&id("sensor.drop")));
        assert!(filter.matches(&id("light.any")));
    }

    #[test]
    fn should_only_pass_listed_entities_when_entity_lists_only() {
        let filter = EntityFilter {
            include_entities: set(&["light.a"]),
            exclude_entities: set(&["light.b"]),
            ..EntityFilter::default()
        };
        assert!(filter.matches(&id("light.a")));
        assert!(!filter.matches(&id("light.b")));
        assert!(!filter.matches(&id("light.c")));
    }

    #[test]
    fn should_flag_never_exposed_entities() {
        assert!(is_never_exposed(&id("group.all_locks")));
        assert!(!is_never_exposed(&id("group.allow")));
    }

    #[test]
    fn should_deserialize_partial_filter() {
        let filter: EntityFilter =
            serde_json::from_str(r#"{"exclude_domains": ["script"]}"#).unwrap();
        assert!(filter.exclude_domains.contains("script"));
        assert!(filter.include_domains.is_empty());
    }
}
