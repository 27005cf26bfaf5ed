//! Entity records: the hub's view of one controllable or observable thing.
//!
//! The hub owns a flat table of [`StateRecord`]s keyed by [`EntityId`]
//! (`<domain>.<object_id>`). Each record carries a free-form state string
//! and a loosely-typed attribute bag. The [`view`] module turns those bags
//! into typed per-domain records before any capability logic looks at them.

mod attribute_value;
mod domain;
pub mod state;
pub mod view;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{Timestamp, now};

pub use attribute_value::AttributeValue;
pub use domain::EntityDomain;

/// Hub entity identifier, e.g. `light.living_room`.
///
/// Both halves are non-empty and limited to `[a-z0-9_]`, so the id never
/// contains `.` beyond the separator nor `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// The domain half (`light` in `light.living_room`).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.split().0
    }

    /// The object half (`living_room` in `light.living_room`).
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.split().1
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split(&self) -> (&str, &str) {
        // validated on construction
        self.0.split_once('.').unwrap_or((&self.0, ""))
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, object_id)) if is_valid_part(domain) && is_valid_part(object_id) => {
                Ok(Self(s.to_string()))
            }
            _ => Err(ValidationError::InvalidEntityId(s.to_string())),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loosely-typed attribute bag attached to a [`StateRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(HashMap<String, AttributeValue>);

impl Attributes {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric attribute, accepting numbers and numeric strings.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttributeValue::as_f64)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttributeValue::as_bool)
    }

    /// List of strings; non-string items are skipped.
    #[must_use]
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(AttributeValue::as_str_list).unwrap_or_default()
    }

    /// The `supported_features` bitmask, `0` when absent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn supported_features(&self) -> u32 {
        self.get_f64("supported_features")
            .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map_or(0, |v| v as u32)
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One row of the hub's state table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub entity_id: EntityId,
    pub state: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default = "now")]
    pub last_updated: Timestamp,
}

impl StateRecord {
    /// Create a record with no attributes, stamped with the current time.
    pub fn new(entity_id: EntityId, state: impl Into<String>) -> Self {
        Self {
            entity_id,
            state: state.into(),
            attributes: Attributes::default(),
            last_updated: now(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// The `friendly_name` attribute, falling back to the object id with
    /// underscores replaced by spaces.
    #[must_use]
    pub fn friendly_name(&self) -> String {
        self.attributes
            .get_str("friendly_name")
            .map_or_else(|| self.entity_id.object_id().replace('_', " "), str::to_string)
    }

    /// Whether the hub can currently reach the entity.
    #[must_use]
    pub fn is_available(&self) -> bool {
        state::is_available(&self.state)
    }
}
