//! Wire types for the OpenWhisk actions API.
//!
//! Field omission mirrors what the platform expects: unset optional values
//! and empty strings are left out of the JSON body entirely, so a payload
//! carrying only a `version` serializes to `{"version":"..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Annotation key the platform injects to describe the runtime kind.
pub const EXEC_ANNOTATION: &str = "exec";

/// Version the platform assigns when none is supplied.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// A single key/value entry used for annotations and parameters.
///
/// The value is an arbitrary JSON document. Numbers keep their original
/// literal text, so precision-sensitive parameters pass through unmodified.
///
/// # Example
///
/// ```
/// use openwhisk::KeyValue;
///
/// let kv: KeyValue = serde_json::from_str(r#"{"key":"count","value":9007199254740993}"#).unwrap();
/// assert_eq!(serde_json::to_string(&kv).unwrap(), r#"{"key":"count","value":9007199254740993}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Entry key. Duplicates are allowed.
    pub key: String,
    /// Entry value.
    pub value: Value,
}

impl KeyValue {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of key/value entries.
pub type KeyValueArr = Vec<KeyValue>;

/// Execution specification of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exec {
    /// Runtime kind, e.g. `nodejs:20` or `blackbox`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Source code (or base64 archive) to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Container image for `blackbox` actions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Optional init archive reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub init: String,
}

/// Resource limits enforced by the platform.
///
/// `None` means "not sent", which is different from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    /// Memory in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

/// An OpenWhisk action as sent to and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Namespace the action lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Action name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Semantic version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Whether the action is published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    /// Execution specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<Exec>,
    /// Annotations, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: KeyValueArr,
    /// Parameters bound into the invocation context, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: KeyValueArr,
    /// Resource limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
}

impl Action {
    /// Create an action with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Look up the first annotation with the given key.
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| &kv.value)
    }

    /// Name relative to the namespace, as used in `/actions/{name}` paths.
    ///
    /// The platform reports a packaged action with its bare name and the
    /// package folded into the namespace (`guest/utils`), so the package
    /// segment is put back in front of the name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self
            .namespace
            .as_deref()
            .and_then(|ns| ns.split_once('/'))
            .map(|(_, package)| package)
            .filter(|package| !package.is_empty())
        {
            Some(package) => format!("{}/{}", package, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "/{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let mut action = Action::named("hello");
        assert_eq!(action.qualified_name(), "hello");

        action.namespace = Some("guest".to_string());
        assert_eq!(action.qualified_name(), "hello");

        action.namespace = Some("guest/utils".to_string());
        assert_eq!(action.qualified_name(), "utils/hello");
        assert_eq!(action.to_string(), "/guest/utils/hello");
    }

    #[test]
    fn test_version_only_payload() {
        let payload = Action {
            version: "0.0.2".to_string(),
            ..Action::default()
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"version":"0.0.2"}"#
        );
    }

    #[test]
    fn test_limits_omit_unset_fields() {
        let limits = Limits {
            timeout: Some(600),
            memory: None,
        };
        assert_eq!(serde_json::to_string(&limits).unwrap(), r#"{"timeout":600}"#);

        let zero = Limits {
            timeout: Some(0),
            memory: Some(0),
        };
        assert_eq!(
            serde_json::to_string(&zero).unwrap(),
            r#"{"timeout":0,"memory":0}"#
        );
    }

    #[test]
    fn test_exec_omits_empty_strings() {
        let exec = Exec {
            kind: "nodejs:20".to_string(),
            code: Some("x".to_string()),
            ..Exec::default()
        };
        assert_eq!(
            serde_json::to_string(&exec).unwrap(),
            r#"{"kind":"nodejs:20","code":"x"}"#
        );
    }

    #[test]
    fn test_deserialize_platform_response() {
        let body = r#"{
            "namespace": "guest",
            "name": "hello",
            "version": "0.0.3",
            "publish": false,
            "exec": {"kind": "nodejs:20", "code": "x", "binary": false},
            "annotations": [{"key": "exec", "value": "nodejs:20"}],
            "parameters": [],
            "limits": {"timeout": 60000, "memory": 256, "logs": 10, "concurrency": 1}
        }"#;

        let action: Action = serde_json::from_str(body).unwrap();
        assert_eq!(action.name, "hello");
        assert_eq!(action.publish, Some(false));
        assert_eq!(action.exec.as_ref().unwrap().kind, "nodejs:20");
        assert_eq!(action.limits.unwrap().memory, Some(256));
        assert_eq!(
            action.annotation(EXEC_ANNOTATION),
            Some(&Value::String("nodejs:20".to_string()))
        );
        assert_eq!(action.to_string(), "/guest/hello");
    }
}
