//! Per-instance resource data
//!
//! [`ResourceData`] is what lifecycle operations receive: the identifier,
//! the desired configuration, the prior state and the new state being
//! written. Reads go to the configuration, writes go to the new state.

use crate::types::{Attributes, InstanceState};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Whether a value counts as unset: null, false, "", 0, an empty list or
/// an object whose members are all unset.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_zero),
    }
}

/// Compare two optional values, treating unset and zero alike
///
/// Objects are compared member by member so that `{"image": ""}` equals `{}`.
pub fn values_equal(old: Option<&Value>, new: Option<&Value>) -> bool {
    let old = old.filter(|v| !is_zero(v));
    let new = new.filter(|v| !is_zero(v));
    match (old, new) {
        (None, None) => true,
        (Some(Value::Object(a)), Some(Value::Object(b))) => a
            .keys()
            .chain(b.keys())
            .all(|k| values_equal(a.get(k), b.get(k))),
        (Some(Value::Array(a)), Some(Value::Array(b))) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b.iter())
                    .all(|(x, y)| values_equal(Some(x), Some(y)))
        }
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Data handed to a resource's lifecycle operations
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    config: Attributes,
    prior: Attributes,
    state: Attributes,
}

impl ResourceData {
    /// Data for a create: desired configuration, no identifier
    ///
    /// The new state starts out as the configuration; a read overwrites
    /// whatever the remote system reports.
    pub fn new(config: Attributes) -> Self {
        Self {
            state: config.clone(),
            config,
            ..Self::default()
        }
    }

    /// Data for read, delete and exists, built from persisted state
    pub fn from_state(instance: &InstanceState) -> Self {
        Self {
            id: Some(instance.id.clone()),
            config: instance.attributes.clone(),
            prior: instance.attributes.clone(),
            state: instance.attributes.clone(),
        }
    }

    /// Data for an in-place update from `prior` towards `config`
    pub fn for_update(prior: &InstanceState, config: Attributes) -> Self {
        Self {
            id: Some(prior.id.clone()),
            state: config.clone(),
            config,
            prior: prior.attributes.clone(),
        }
    }

    /// Data for an import: only the identifier is known
    pub fn importing(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Identifier of the remote object, if it has one
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the instance as gone
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Configured value of an attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    /// Configured value of an attribute, unless it is a zero value
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_zero(v))
    }

    /// Whether the configured value differs from the prior state
    pub fn has_change(&self, key: &str) -> bool {
        !values_equal(self.prior.get(key), self.config.get(key))
    }

    /// Record an attribute in the new state
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    pub fn config(&self) -> &Attributes {
        &self.config
    }

    pub fn prior(&self) -> &Attributes {
        &self.prior
    }

    pub fn state(&self) -> &Attributes {
        &self.state
    }

    /// Decode the configuration into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.config.clone()))
    }

    /// State to persist, or None once the identifier is cleared
    pub fn to_instance_state(&self) -> Option<InstanceState> {
        self.id()
            .map(|id| InstanceState::new(id, self.state.clone()))
    }
}
