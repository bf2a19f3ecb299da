//! Diff computation for resources

use crate::data::values_equal;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::types::{Attributes, ChangeAction, InstanceState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One attribute that differs between prior state and configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
    /// Changing this attribute forces a replacement
    pub force_new: bool,
}

/// A diff between the prior state and desired configuration of an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Instance address, `<type>.<label>`
    pub address: String,
    pub resource_type: String,
    pub action: ChangeAction,
    pub changes: Vec<AttributeChange>,
}

impl ResourceDiff {
    /// Compute the diff for one instance
    ///
    /// `desired` is the configuration with defaults applied, or None when
    /// the instance is no longer configured.
    pub fn compute(
        address: &str,
        resource_type: &str,
        schema: &Schema,
        prior: Option<&InstanceState>,
        desired: Option<&Attributes>,
    ) -> Self {
        let (action, changes) = match (prior, desired) {
            (None, None) => (ChangeAction::NoOp, Vec::new()),
            (None, Some(desired)) => (ChangeAction::Create, all_set(desired, false)),
            (Some(prior), None) => (ChangeAction::Delete, all_set(&prior.attributes, true)),
            (Some(prior), Some(desired)) => {
                let changes = attribute_changes(schema, &prior.attributes, desired);
                let action = if changes.is_empty() {
                    ChangeAction::NoOp
                } else if changes.iter().any(|c| c.force_new) {
                    ChangeAction::Replace
                } else {
                    ChangeAction::Update
                };
                (action, changes)
            }
        };

        Self {
            address: address.to_string(),
            resource_type: resource_type.to_string(),
            action,
            changes,
        }
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.action == ChangeAction::Create
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.action == ChangeAction::Delete
    }

    /// Check if this diff represents an in-place modification
    pub fn is_modification(&self) -> bool {
        self.action == ChangeAction::Update
    }

    /// Check if this diff represents a delete-then-create
    pub fn is_replacement(&self) -> bool {
        self.action == ChangeAction::Replace
    }

    pub fn has_changes(&self) -> bool {
        self.action.is_change()
    }
}

fn all_set(attributes: &Attributes, removing: bool) -> Vec<AttributeChange> {
    attributes
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(name, value)| AttributeChange {
            name: name.clone(),
            old: removing.then(|| value.clone()),
            new: (!removing).then(|| value.clone()),
            force_new: false,
        })
        .collect()
}

fn attribute_changes(
    schema: &Schema,
    prior: &Attributes,
    desired: &Attributes,
) -> Vec<AttributeChange> {
    schema
        .attributes()
        .filter_map(|(name, attr)| {
            let old = prior.get(name);
            let new = desired.get(name);
            if attribute_equal(attr, old, new) {
                return None;
            }
            Some(AttributeChange {
                name: name.to_string(),
                old: old.cloned(),
                new: new.cloned(),
                force_new: attr.force_new,
            })
        })
        .collect()
}

/// Whether an attribute is unchanged
///
/// Optional attributes without a default that are absent from the
/// configuration are not managed and never differ.
fn attribute_equal(attr: &Attribute, old: Option<&Value>, new: Option<&Value>) -> bool {
    let new = new.filter(|v| !v.is_null());
    if new.is_none() && !attr.required && attr.default.is_none() {
        return true;
    }

    if let (AttributeType::String, Some(Value::String(old)), Some(Value::String(new))) =
        (&attr.ty, old, new)
    {
        let (old, new) = match attr.state_func {
            Some(state_func) => (state_func(old), state_func(new)),
            None => (old.clone(), new.clone()),
        };
        if old == new {
            return true;
        }
        return attr
            .diff_suppress
            .is_some_and(|suppress| suppress(&old, &new));
    }

    values_equal(old, new)
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of instances to create
    pub additions: usize,
    /// Number of instances to delete
    pub removals: usize,
    /// Number of instances to update in place
    pub modifications: usize,
    /// Number of instances to replace
    pub replacements: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs<'a>(diffs: impl IntoIterator<Item = &'a ResourceDiff>) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                ChangeAction::Create => summary.additions += 1,
                ChangeAction::Delete => summary.removals += 1,
                ChangeAction::Update => summary.modifications += 1,
                ChangeAction::Replace => summary.replacements += 1,
                ChangeAction::NoOp => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications + self.replacements
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type<'a>(
    diffs: impl IntoIterator<Item = &'a ResourceDiff>,
) -> BTreeMap<String, Vec<&'a ResourceDiff>> {
    let mut groups: BTreeMap<String, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}
