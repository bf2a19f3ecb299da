//! Execution planner - builds resource execution plans

use crate::diff::{DiffSummary, ResourceDiff};
use crate::provider::Provider;
use crate::types::{Attributes, ChangeAction, InstanceState};
use anyhow::{Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Address of a resource instance: `<type>.<label>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    pub resource_type: String,
    pub label: String,
}

impl Address {
    pub fn new(resource_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            label: label.into(),
        }
    }

    /// Parse `type.label`
    pub fn parse(s: &str) -> Option<Self> {
        let (resource_type, label) = s.split_once('.')?;
        if resource_type.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self::new(resource_type, label))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.label)
    }
}

/// One instance in a plan
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub address: Address,
    pub diff: ResourceDiff,
    /// Persisted state before the change
    pub prior: Option<InstanceState>,
    /// Validated configuration with defaults applied
    pub desired: Option<Attributes>,
}

impl PlannedChange {
    pub fn action(&self) -> ChangeAction {
        self.diff.action
    }
}

/// An execution plan: one entry per known instance
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub changes: Vec<PlannedChange>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from desired configuration and persisted state
    ///
    /// Every configured instance is validated against its schema first; all
    /// problems across all instances are reported together.
    pub fn build<M: ?Sized>(
        provider: &Provider<M>,
        desired: &BTreeMap<Address, Attributes>,
        prior: &BTreeMap<Address, InstanceState>,
    ) -> Result<Self> {
        let problems = validate_desired(provider, desired);
        if !problems.is_empty() {
            bail!("invalid configuration:\n  {}", problems.join("\n  "));
        }

        let addresses: BTreeSet<&Address> = desired.keys().chain(prior.keys()).collect();
        let mut plan = Self::new();

        for address in addresses {
            let Some(resource) = provider.resource(&address.resource_type) else {
                bail!(
                    "{}: unknown resource type '{}'",
                    address,
                    address.resource_type
                );
            };
            let schema = resource.schema();

            let desired = desired.get(address).map(|config| {
                let mut config = config.clone();
                schema.apply_defaults(&mut config);
                config
            });
            let prior = prior.get(address).cloned();

            let diff = ResourceDiff::compute(
                &address.to_string(),
                &address.resource_type,
                schema,
                prior.as_ref(),
                desired.as_ref(),
            );

            plan.changes.push(PlannedChange {
                address: address.clone(),
                diff,
                prior,
                desired,
            });
        }

        Ok(plan)
    }

    /// A plan that deletes every instance in `prior`
    pub fn destroy(prior: &BTreeMap<Address, InstanceState>) -> Self {
        let changes = prior
            .iter()
            .map(|(address, state)| PlannedChange {
                address: address.clone(),
                diff: ResourceDiff {
                    address: address.to_string(),
                    resource_type: address.resource_type.clone(),
                    action: ChangeAction::Delete,
                    changes: Vec::new(),
                },
                prior: Some(state.clone()),
                desired: None,
            })
            .collect();
        Self { changes }
    }

    /// Filter plan to only include changes matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlannedChange) -> bool,
    {
        Self {
            changes: self.changes.into_iter().filter(|c| predicate(c)).collect(),
        }
    }

    /// Filter plan to only include instances matching a target pattern
    ///
    /// Target format: "type" or "type.label"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, label) = parse_target(t);
                self.filter(|c| matches_filter(&c.address, &resource_type, label.as_deref()))
            }
        }
    }

    /// Entries that change something
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action().is_change())
    }

    /// Number of entries that change something
    pub fn total_changes(&self) -> usize {
        self.pending().count()
    }

    /// Check if plan has nothing to do
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_diffs(self.changes.iter().map(|c| &c.diff))
    }
}

/// Validate every configured instance, returning problems prefixed with
/// the instance address
pub fn validate_desired<M: ?Sized>(
    provider: &Provider<M>,
    desired: &BTreeMap<Address, Attributes>,
) -> Vec<String> {
    let mut problems = Vec::new();
    for (address, config) in desired {
        match provider.resource(&address.resource_type) {
            None => problems.push(format!(
                "{}: unknown resource type '{}'",
                address, address.resource_type
            )),
            Some(resource) => {
                if let Err(err) = resource.schema().validate(config) {
                    problems.extend(err.problems.iter().map(|p| format!("{}: {}", address, p)));
                }
            }
        }
    }
    problems
}

/// Parse a target string like "type.label" into (type, label)
fn parse_target(target: &str) -> (String, Option<String>) {
    match target.split_once('.') {
        None => (target.to_string(), None),
        Some((resource_type, label)) => (resource_type.to_string(), Some(label.to_string())),
    }
}

/// Check if an address matches the filter criteria
fn matches_filter(address: &Address, resource_type: &str, label: Option<&str>) -> bool {
    if address.resource_type != resource_type {
        return false;
    }

    if let Some(l) = label
        && address.label != l
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ResourceData;
    use crate::resource::Resource;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;

    #[derive(Debug)]
    struct Thing {
        schema: Schema,
    }

    impl Thing {
        fn new() -> Self {
            Self {
                schema: Schema::new()
                    .with_attribute("name", Attribute::string().required().force_new())
                    .with_attribute("size", Attribute::int().default_value(json!(1))),
            }
        }
    }

    impl Resource<()> for Thing {
        fn type_name(&self) -> &'static str {
            "thing"
        }
        fn schema(&self) -> &Schema {
            &self.schema
        }
        fn create(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn read(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn update(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn delete(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn exists(&self, _data: &ResourceData, _meta: &()) -> Result<bool> {
            Ok(true)
        }
    }

    fn provider() -> Provider<()> {
        let mut provider: Provider<()> = Provider::new("test");
        provider.register(Box::new(Thing::new())).unwrap();
        provider
    }

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("thing"), ("thing".to_string(), None));
        assert_eq!(
            parse_target("thing.a"),
            ("thing".to_string(), Some("a".to_string()))
        );
    }

    #[test]
    fn test_address_parse() {
        let address = Address::parse("thing.a").unwrap();
        assert_eq!(address, Address::new("thing", "a"));
        assert_eq!(address.to_string(), "thing.a");
        assert!(Address::parse("thing").is_none());
        assert!(Address::parse(".a").is_none());
    }

    #[test]
    fn test_build_plan() {
        let mut desired = BTreeMap::new();
        desired.insert(Address::new("thing", "a"), attrs(json!({"name": "a"})));
        desired.insert(Address::new("thing", "b"), attrs(json!({"name": "b", "size": 1})));

        let mut prior = BTreeMap::new();
        prior.insert(
            Address::new("thing", "b"),
            InstanceState::new("b", attrs(json!({"name": "b", "size": 1}))),
        );
        prior.insert(
            Address::new("thing", "c"),
            InstanceState::new("c", attrs(json!({"name": "c"}))),
        );

        let plan = ExecutionPlan::build(&provider(), &desired, &prior).unwrap();
        let actions: Vec<_> = plan.changes.iter().map(|c| c.action()).collect();
        assert_eq!(
            actions,
            vec![ChangeAction::Create, ChangeAction::NoOp, ChangeAction::Delete]
        );
        assert_eq!(plan.total_changes(), 2);
        assert_eq!(plan.changes[0].desired.as_ref().unwrap()["size"], json!(1));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut desired = BTreeMap::new();
        desired.insert(Address::new("thing", "a"), attrs(json!({"size": "big"})));
        desired.insert(Address::new("gadget", "b"), attrs(json!({})));

        let err = ExecutionPlan::build(&provider(), &desired, &BTreeMap::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("thing.a: name: required attribute is missing"));
        assert!(message.contains("thing.a: size: expected integer"));
        assert!(message.contains("gadget.b: unknown resource type 'gadget'"));
    }

    #[test]
    fn test_filter_by_target() {
        let mut desired = BTreeMap::new();
        desired.insert(Address::new("thing", "a"), attrs(json!({"name": "a"})));
        desired.insert(Address::new("thing", "b"), attrs(json!({"name": "b"})));

        let plan = ExecutionPlan::build(&provider(), &desired, &BTreeMap::new()).unwrap();
        assert_eq!(plan.clone().filter_by_target(Some("thing")).total_changes(), 2);
        assert_eq!(plan.clone().filter_by_target(Some("thing.b")).total_changes(), 1);
        assert_eq!(plan.filter_by_target(Some("gadget")).total_changes(), 0);
    }

    #[test]
    fn test_destroy_plan() {
        let mut prior = BTreeMap::new();
        prior.insert(
            Address::new("thing", "a"),
            InstanceState::new("a", Attributes::new()),
        );
        let plan = ExecutionPlan::destroy(&prior);
        assert_eq!(plan.summary().removals, 1);
    }
}
