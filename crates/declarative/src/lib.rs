//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! comparing it with persisted state, and driving remote systems towards it
//! through a create/read/update/delete lifecycle.
//!
//! ## Core Concepts
//!
//! - **Schema**: The attributes a resource accepts, with validation, defaults,
//!   diff suppression and force-new markers
//! - **ResourceData**: What a lifecycle operation reads from and writes to
//! - **Resource**: One kind of remote object and its lifecycle
//! - **Provider**: An explicit registry of resources, built at startup
//! - **ExecutionPlan**: Per-instance diffs between configuration and state
//! - **Executor**: Applies a plan with parallelism, refreshes and imports
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     Address, Attribute, ExecuteOptions, ExecutionPlan, Provider, Resource,
//!     ResourceData, Schema, execute_simple,
//! };
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! #[derive(Debug)]
//! struct Echo {
//!     schema: Schema,
//! }
//!
//! impl Resource<()> for Echo {
//!     fn type_name(&self) -> &'static str { "echo" }
//!     fn schema(&self) -> &Schema { &self.schema }
//!
//!     fn create(&self, data: &mut ResourceData, meta: &()) -> anyhow::Result<()> {
//!         data.set_id("echo-1");
//!         self.read(data, meta)
//!     }
//!     fn read(&self, data: &mut ResourceData, _meta: &()) -> anyhow::Result<()> {
//!         if let Some(text) = data.get("text").cloned() {
//!             data.set("text", text);
//!         }
//!         Ok(())
//!     }
//!     fn update(&self, data: &mut ResourceData, meta: &()) -> anyhow::Result<()> {
//!         self.read(data, meta)
//!     }
//!     fn delete(&self, data: &mut ResourceData, _meta: &()) -> anyhow::Result<()> {
//!         data.clear_id();
//!         Ok(())
//!     }
//!     fn exists(&self, _data: &ResourceData, _meta: &()) -> anyhow::Result<bool> {
//!         Ok(true)
//!     }
//! }
//!
//! let mut provider: Provider<()> = Provider::new("demo");
//! provider.register(Box::new(Echo {
//!     schema: Schema::new().with_attribute("text", Attribute::string().required()),
//! }))?;
//!
//! let mut desired = BTreeMap::new();
//! desired.insert(
//!     Address::new("echo", "hello"),
//!     json!({"text": "hi"}).as_object().cloned().unwrap(),
//! );
//!
//! let plan = ExecutionPlan::build(&provider, &desired, &BTreeMap::new())?;
//! let report = execute_simple(&provider, &(), plan, ExecuteOptions::default())?;
//! assert_eq!(report.summary.created, 1);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod data;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use data::{ResourceData, is_zero, values_equal};
pub use diff::{AttributeChange, DiffSummary, ResourceDiff, group_by_type};
pub use executor::{
    ApplyOutcome, ExecuteReport, execute, execute_simple, import_instance, refresh_all,
    refresh_instance,
};
pub use planner::{Address, ExecutionPlan, PlannedChange, validate_desired};
pub use provider::Provider;
pub use resource::{BoxedResource, Resource};
pub use schema::{Attribute, AttributeType, Schema, ValidationError};
pub use types::{
    ApplyResult, Attributes, ChangeAction, ExecuteOptions, ExecuteSummary, InstanceState,
};
