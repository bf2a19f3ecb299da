//! Resource schemas
//!
//! A [`Schema`] describes the attributes a resource accepts: their types,
//! which are required, which force a replacement when changed, and how
//! string values are validated, normalized and compared.
//!
//! ```
//! use declarative::{Attribute, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with_attribute("name", Attribute::string().required().force_new())
//!     .with_attribute("version", Attribute::string().default_value(json!("0.0.1")));
//!
//! let mut config = json!({"name": "hello"}).as_object().cloned().unwrap();
//! schema.validate(&config).unwrap();
//! schema.apply_defaults(&mut config);
//! assert_eq!(config["version"], "0.0.1");
//! ```

use crate::types::Attributes;
use serde_json::Value;
use std::collections::BTreeMap;

/// Validates a single attribute value, returning a message on failure.
pub type ValidateFn = fn(&Value) -> Result<(), String>;

/// Decides whether two string values are equivalent (old, new).
pub type DiffSuppressFn = fn(&str, &str) -> bool;

/// Maps a configured string to the form stored in state.
pub type StateFn = fn(&str) -> String;

/// Value type of an attribute
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// A list of nested blocks, each described by its own schema
    Block(Box<Schema>),
}

impl AttributeType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "integer",
            Self::Block(_) => "list of blocks",
        }
    }
}

/// Description of one attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub ty: AttributeType,
    pub required: bool,
    /// Changing this attribute requires destroying and recreating the resource
    pub force_new: bool,
    pub default: Option<Value>,
    /// Maximum number of blocks for block attributes
    pub max_items: Option<usize>,
    pub description: &'static str,
    pub validate: Option<ValidateFn>,
    pub diff_suppress: Option<DiffSuppressFn>,
    pub state_func: Option<StateFn>,
}

impl Attribute {
    fn of(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            force_new: false,
            default: None,
            max_items: None,
            description: "",
            validate: None,
            diff_suppress: None,
            state_func: None,
        }
    }

    /// Optional string attribute
    pub fn string() -> Self {
        Self::of(AttributeType::String)
    }

    /// Optional bool attribute
    pub fn bool() -> Self {
        Self::of(AttributeType::Bool)
    }

    /// Optional integer attribute
    pub fn int() -> Self {
        Self::of(AttributeType::Int)
    }

    /// Optional list of nested blocks
    pub fn block(schema: Schema) -> Self {
        Self::of(AttributeType::Block(Box::new(schema)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn validate_with(mut self, f: ValidateFn) -> Self {
        self.validate = Some(f);
        self
    }

    pub fn diff_suppress_with(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn state_with(mut self, f: StateFn) -> Self {
        self.state_func = Some(f);
        self
    }

    /// Nested schema for block attributes
    pub fn block_schema(&self) -> Option<&Schema> {
        match &self.ty {
            AttributeType::Block(schema) => Some(schema),
            _ => None,
        }
    }

    fn type_matches(&self, value: &Value) -> bool {
        match &self.ty {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Int => value.is_i64() || value.is_u64(),
            AttributeType::Block(_) => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }
}

/// Configuration rejected by a schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {}", .problems.join("; "))]
pub struct ValidationError {
    /// Every problem found, each prefixed with its attribute path
    pub problems: Vec<String>,
}

/// Attribute descriptors of a resource or nested block
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute (builder style)
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attributes in name order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check a configuration against this schema
    ///
    /// Every problem is reported, not just the first one.
    pub fn validate(&self, config: &Attributes) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        self.collect_problems("", config, &mut problems);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { problems })
        }
    }

    fn collect_problems(&self, prefix: &str, config: &Attributes, problems: &mut Vec<String>) {
        for key in config.keys() {
            if !self.attributes.contains_key(key) {
                problems.push(format!("{}{}: unsupported attribute", prefix, key));
            }
        }

        for (name, attr) in &self.attributes {
            let path = format!("{}{}", prefix, name);
            let value = config.get(name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if attr.required && attr.default.is_none() {
                    problems.push(format!("{}: required attribute is missing", path));
                }
                continue;
            };

            if !attr.type_matches(value) {
                problems.push(format!("{}: expected {}", path, attr.ty.name()));
                continue;
            }

            if let (AttributeType::Block(inner), Some(items)) = (&attr.ty, value.as_array()) {
                if attr.required && items.is_empty() {
                    problems.push(format!("{}: at least one block is required", path));
                }
                if let Some(max) = attr.max_items
                    && items.len() > max
                {
                    problems.push(format!(
                        "{}: at most {} block(s) allowed, found {}",
                        path,
                        max,
                        items.len()
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    if let Some(block) = item.as_object() {
                        inner.collect_problems(&format!("{}.{}.", path, i), block, problems);
                    }
                }
            }

            if let Some(validate) = attr.validate
                && let Err(message) = validate(value)
            {
                problems.push(format!("{}: {}", path, message));
            }
        }
    }

    /// Fill in defaults for attributes that are missing or null
    pub fn apply_defaults(&self, config: &mut Attributes) {
        for (name, attr) in &self.attributes {
            let missing = config.get(name).is_none_or(Value::is_null);
            if missing && let Some(default) = &attr.default {
                config.insert(name.clone(), default.clone());
            }

            if let (Some(inner), Some(Value::Array(items))) =
                (attr.block_schema(), config.get_mut(name))
            {
                for item in items.iter_mut() {
                    if let Value::Object(block) = item {
                        inner.apply_defaults(block);
                    }
                }
            }
        }
    }

    /// Run state functions over string attributes
    pub fn normalize(&self, config: &mut Attributes) {
        for (name, attr) in &self.attributes {
            let Some(state_func) = attr.state_func else {
                continue;
            };
            if let Some(Value::String(s)) = config.get_mut(name) {
                *s = state_func(s);
            }
        }
    }
}
