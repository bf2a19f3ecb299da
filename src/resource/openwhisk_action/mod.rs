//! `ibm_openwhisk_action`: serverless actions on Apache OpenWhisk.
//!
//! The action name is the identifier. Only `publish` and `version` can be
//! changed in place; every other managed attribute forces a replacement.

pub mod mapping;

use crate::json;
use crate::resource::error::ActionError;
use crate::session::ClientSession;
use declarative::{Attribute, Resource, ResourceData, Schema};
use mapping::{
    ExecBlock, LimitsBlock, expand_annotations, expand_exec, expand_limits, expand_parameters,
    flatten_annotations, flatten_exec, flatten_limits, flatten_parameters,
};
use openwhisk::{Action, DEFAULT_VERSION, KeyValueArr};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

pub const RESOURCE_TYPE: &str = "ibm_openwhisk_action";

/// Longest entity name the platform accepts
const MAX_NAME_LEN: usize = 256;

static ENTITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\w|\w[\w@ .-]*[\w@.-])$").expect("entity name pattern is valid")
});

/// Validated configuration of one action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionConfig {
    pub name: String,
    #[serde(default)]
    pub overwrite: bool,
    pub limits: Vec<LimitsBlock>,
    pub exec: Vec<ExecBlock>,
    #[serde(default)]
    pub publish: Option<bool>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub annotations: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
}

impl ActionConfig {
    /// Decode and check the configuration held by `data`
    pub fn from_data(data: &ResourceData) -> Result<Self, ActionError> {
        let config: Self = data
            .decode()
            .map_err(|e| ActionError::Validation(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ActionError> {
        validate_name(&Value::String(self.name.clone())).map_err(ActionError::Validation)?;

        if self.limits.len() != 1 {
            return Err(ActionError::Validation(format!(
                "exactly one limits block is required, found {}",
                self.limits.len()
            )));
        }
        if self.exec.len() != 1 {
            return Err(ActionError::Validation(format!(
                "exactly one exec block is required, found {}",
                self.exec.len()
            )));
        }

        for (field, value) in [
            ("annotations", &self.annotations),
            ("parameters", &self.parameters),
        ] {
            if let Some(s) = value.as_deref().filter(|s| !s.is_empty()) {
                json::validate(&Value::String(s.to_string()))
                    .map_err(|e| ActionError::Validation(format!("{}: {}", field, e)))?;
            }
        }
        Ok(())
    }

    fn annotations(&self) -> Result<KeyValueArr, ActionError> {
        match self.annotations.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => expand_annotations(s),
            None => Ok(KeyValueArr::new()),
        }
    }

    fn parameters(&self) -> Result<KeyValueArr, ActionError> {
        match self.parameters.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => expand_parameters(s),
            None => Ok(KeyValueArr::new()),
        }
    }
}

/// Attribute validator for action names, optionally `package/action`
fn validate_name(value: &Value) -> Result<(), String> {
    let name = value.as_str().unwrap_or_default();
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("name is longer than {} characters", MAX_NAME_LEN));
    }

    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() > 2 || !segments.iter().all(|s| ENTITY_NAME.is_match(s)) {
        return Err(format!("'{}' is not a valid OpenWhisk entity name", name));
    }
    Ok(())
}

fn limits_schema() -> Schema {
    Schema::new()
        .with_attribute(
            "timeout",
            Attribute::int()
                .required()
                .description("Timeout in milliseconds"),
        )
        .with_attribute(
            "memory",
            Attribute::int().required().description("Memory in megabytes"),
        )
}

fn exec_schema() -> Schema {
    Schema::new()
        .with_attribute(
            "image",
            Attribute::string().description("Container image name when kind is 'blackbox'"),
        )
        .with_attribute(
            "init",
            Attribute::string().description("Optional zipfile reference when kind is 'nodejs'"),
        )
        .with_attribute(
            "code",
            Attribute::string()
                .required()
                .description("Code to execute when kind is 'nodejs' or 'swift'"),
        )
        .with_attribute(
            "kind",
            Attribute::string()
                .required()
                .description("The type of action: nodejs, blackbox, swift"),
        )
}

fn json_attribute(description: &'static str) -> Attribute {
    Attribute::string()
        .force_new()
        .description(description)
        .validate_with(json::validate)
        .diff_suppress_with(json::equivalent)
        .state_with(json::normalize_or_raw)
}

pub fn action_schema() -> Schema {
    Schema::new()
        .with_attribute(
            "name",
            Attribute::string()
                .required()
                .force_new()
                .description("The name of the action")
                .validate_with(validate_name),
        )
        .with_attribute(
            "overwrite",
            Attribute::bool()
                .default_value(Value::Bool(false))
                .description("Overwrite item if it exists"),
        )
        .with_attribute(
            "limits",
            Attribute::block(limits_schema())
                .required()
                .max_items(1)
                .force_new(),
        )
        .with_attribute(
            "exec",
            Attribute::block(exec_schema())
                .required()
                .max_items(1)
                .force_new(),
        )
        .with_attribute(
            "publish",
            Attribute::bool().description("Whether to publish the item"),
        )
        .with_attribute(
            "version",
            Attribute::string()
                .default_value(Value::String(DEFAULT_VERSION.to_string()))
                .description("Semantic version of the item"),
        )
        .with_attribute(
            "annotations",
            json_attribute("Annotations on the item"),
        )
        .with_attribute(
            "parameters",
            json_attribute("Parameter bindings passed to the action")
                .default_value(Value::String("[]".to_string())),
        )
}

/// The `ibm_openwhisk_action` resource
#[derive(Debug)]
pub struct OpenWhiskAction {
    schema: Schema,
}

impl OpenWhiskAction {
    pub fn new() -> Self {
        Self {
            schema: action_schema(),
        }
    }
}

impl Default for OpenWhiskAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource<dyn ClientSession> for OpenWhiskAction {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn create(&self, data: &mut ResourceData, session: &dyn ClientSession) -> anyhow::Result<()> {
        Ok(create(data, session)?)
    }

    fn read(&self, data: &mut ResourceData, session: &dyn ClientSession) -> anyhow::Result<()> {
        Ok(read(data, session)?)
    }

    fn update(&self, data: &mut ResourceData, session: &dyn ClientSession) -> anyhow::Result<()> {
        Ok(update(data, session)?)
    }

    fn delete(&self, data: &mut ResourceData, session: &dyn ClientSession) -> anyhow::Result<()> {
        Ok(delete(data, session)?)
    }

    fn exists(&self, data: &ResourceData, session: &dyn ClientSession) -> anyhow::Result<bool> {
        Ok(exists(data, session)?)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

fn client(session: &dyn ClientSession) -> Result<openwhisk::Client, ActionError> {
    session.openwhisk_client().map_err(ActionError::Session)
}

fn tracked_id(data: &ResourceData) -> String {
    data.id().unwrap_or_default().to_string()
}

/// Insert the action, then read it back
pub fn create(data: &mut ResourceData, session: &dyn ClientSession) -> Result<(), ActionError> {
    let config = ActionConfig::from_data(data)?;
    let annotations = config.annotations()?;
    let parameters = config.parameters()?;

    let client = client(session)?;
    let payload = Action {
        namespace: Some(client.namespace().to_string()),
        name: config.name.clone(),
        version: config.version.clone().unwrap_or_default(),
        publish: config.publish,
        exec: Some(expand_exec(&config.exec)),
        annotations,
        parameters,
        limits: Some(expand_limits(&config.limits)),
    };

    log::info!("Creating OpenWhisk action {}", config.name);
    let action = client
        .actions()
        .insert(&config.name, &payload, config.overwrite)
        .map_err(|e| ActionError::remote("Error creating OpenWhisk Action", e))?;

    if action.name.is_empty() {
        data.set_id(config.name);
    } else {
        data.set_id(action.qualified_name());
    }

    // A create that cannot read back its action leaves nothing tracked
    if let Err(e) = read(data, session) {
        data.clear_id();
        return Err(e);
    }
    Ok(())
}

/// Fetch the action and mirror it into state
///
/// A missing action is an error here; callers check [`exists`] first.
pub fn read(data: &mut ResourceData, session: &dyn ClientSession) -> Result<(), ActionError> {
    let client = client(session)?;
    let id = tracked_id(data);

    log::debug!("Reading OpenWhisk action {}", id);
    let action = client.actions().get(&id).map_err(|e| {
        ActionError::remote(format!("Error retrieving OpenWhisk Action {}", id), e)
    })?;

    let to_value = |field: &'static str, value: Result<Value, serde_json::Error>| {
        value.map_err(|source| ActionError::Serialization { field, source })
    };
    let limits = to_value("limits", serde_json::to_value(flatten_limits(action.limits.as_ref())))?;
    let exec = to_value("exec", serde_json::to_value(flatten_exec(action.exec.as_ref())))?;
    let annotations = flatten_annotations(&action.annotations)?;
    let parameters = flatten_parameters(&action.parameters)?;

    let name = action.qualified_name();
    data.set_id(name.clone());
    data.set("name", Value::String(name));
    data.set("limits", limits);
    data.set("exec", exec);
    data.set("publish", Value::Bool(action.publish.unwrap_or(false)));
    data.set("version", Value::String(action.version));
    data.set("annotations", Value::String(annotations));
    data.set("parameters", Value::String(parameters));
    Ok(())
}

/// Send only the changed `publish`/`version` fields, then read back
pub fn update(data: &mut ResourceData, session: &dyn ClientSession) -> Result<(), ActionError> {
    let config = ActionConfig::from_data(data)?;
    let client = client(session)?;
    let id = tracked_id(data);

    let mut payload = Action::default();
    if data.has_change("publish") {
        payload.publish = Some(config.publish.unwrap_or(false));
    }
    if data.has_change("version") {
        payload.version = config.version.clone().unwrap_or_default();
    }

    log::info!("Updating OpenWhisk action {}", id);
    client
        .actions()
        .insert(&id, &payload, config.overwrite)
        .map_err(|e| ActionError::remote("Error updating OpenWhisk Action", e))?;

    read(data, session)
}

pub fn delete(data: &mut ResourceData, session: &dyn ClientSession) -> Result<(), ActionError> {
    let client = client(session)?;
    let id = tracked_id(data);

    log::info!("Deleting OpenWhisk action {}", id);
    client
        .actions()
        .delete(&id)
        .map_err(|e| ActionError::remote("Error deleting OpenWhisk Action", e))?;

    data.clear_id();
    Ok(())
}

/// False only when the platform answers "not found"
pub fn exists(data: &ResourceData, session: &dyn ClientSession) -> Result<bool, ActionError> {
    let client = client(session)?;
    let id = tracked_id(data);

    match client.actions().get(&id) {
        Ok(action) => Ok(action.qualified_name() == id),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(ActionError::Communication(e)),
    }
}

/// Headline attributes of an action in state, for display
#[derive(Debug)]
pub struct ActionSummary<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub version: &'a str,
}

impl<'a> ActionSummary<'a> {
    pub fn from_attributes(attributes: &'a declarative::Attributes) -> Self {
        let kind = attributes
            .get("exec")
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("kind"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        Self {
            name: attributes
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            kind,
            version: attributes
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        }
    }
}
