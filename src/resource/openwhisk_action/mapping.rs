//! Translation between configuration blocks and the OpenWhisk wire model.
//!
//! Limits and exec are single-element block lists in configuration and flat
//! objects on the wire. Annotations and parameters are JSON strings in
//! configuration and ordered key/value lists on the wire.

use crate::resource::error::ActionError;
use openwhisk::{EXEC_ANNOTATION, Exec, KeyValue, KeyValueArr, Limits};
use serde::{Deserialize, Serialize};

/// `limits` block. Unset fields stay unset; they are never zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

/// `exec` block. Empty fields are left out of state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecBlock {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub init: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

pub fn expand_limits(blocks: &[LimitsBlock]) -> Limits {
    match blocks.first() {
        Some(block) => Limits {
            timeout: block.timeout,
            memory: block.memory,
        },
        None => Limits::default(),
    }
}

pub fn flatten_limits(limits: Option<&Limits>) -> Vec<LimitsBlock> {
    let limits = limits.copied().unwrap_or_default();
    vec![LimitsBlock {
        timeout: limits.timeout,
        memory: limits.memory,
    }]
}

/// Image and init are sent as empty strings when not configured.
pub fn expand_exec(blocks: &[ExecBlock]) -> Exec {
    match blocks.first() {
        Some(block) => Exec {
            kind: block.kind.clone(),
            code: Some(block.code.clone()),
            image: block.image.clone(),
            init: block.init.clone(),
        },
        None => Exec::default(),
    }
}

pub fn flatten_exec(exec: Option<&Exec>) -> Vec<ExecBlock> {
    let block = exec
        .map(|exec| ExecBlock {
            image: exec.image.clone(),
            init: exec.init.clone(),
            code: exec.code.clone().unwrap_or_default(),
            kind: exec.kind.clone(),
        })
        .unwrap_or_default();
    vec![block]
}

pub fn expand_annotations(annotations: &str) -> Result<KeyValueArr, ActionError> {
    expand_key_values("annotations", annotations)
}

pub fn expand_parameters(parameters: &str) -> Result<KeyValueArr, ActionError> {
    expand_key_values("parameters", parameters)
}

fn expand_key_values(field: &'static str, json: &str) -> Result<KeyValueArr, ActionError> {
    serde_json::from_str(json).map_err(|source| ActionError::Parse { field, source })
}

/// Encode annotations without the `exec` entries the platform injects.
pub fn flatten_annotations(annotations: &[KeyValue]) -> Result<String, ActionError> {
    let user: Vec<&KeyValue> = annotations
        .iter()
        .filter(|kv| kv.key != EXEC_ANNOTATION)
        .collect();
    serde_json::to_string(&user).map_err(|source| ActionError::Serialization {
        field: "annotations",
        source,
    })
}

pub fn flatten_parameters(parameters: &[KeyValue]) -> Result<String, ActionError> {
    serde_json::to_string(parameters).map_err(|source| ActionError::Serialization {
        field: "parameters",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limits_round_trip_when_both_set() {
        let limits = Limits {
            timeout: Some(600),
            memory: Some(128),
        };
        assert_eq!(expand_limits(&flatten_limits(Some(&limits))), limits);
    }

    #[test]
    fn test_flatten_limits_omits_unset_fields() {
        let limits = Limits {
            timeout: Some(600),
            memory: None,
        };
        let blocks = flatten_limits(Some(&limits));
        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([{"timeout": 600}])
        );

        assert_eq!(
            serde_json::to_value(flatten_limits(None)).unwrap(),
            json!([{}])
        );
    }

    #[test]
    fn test_expand_limits_empty_is_unset() {
        assert_eq!(expand_limits(&[]), Limits::default());
        assert_eq!(expand_limits(&[]).timeout, None);
    }

    #[test]
    fn test_expand_exec() {
        let exec = expand_exec(&[ExecBlock {
            kind: "nodejs".into(),
            code: "x".into(),
            ..ExecBlock::default()
        }]);
        assert_eq!(exec.kind, "nodejs");
        assert_eq!(exec.code.as_deref(), Some("x"));
        assert_eq!(exec.image, "");
        assert_eq!(exec.init, "");

        assert_eq!(expand_exec(&[]), Exec::default());
    }

    #[test]
    fn test_flatten_exec_skips_empty_fields() {
        let exec = Exec {
            kind: "blackbox".into(),
            code: None,
            image: "openwhisk/example".into(),
            init: String::new(),
        };
        assert_eq!(
            serde_json::to_value(flatten_exec(Some(&exec))).unwrap(),
            json!([{"kind": "blackbox", "image": "openwhisk/example"}])
        );
    }

    #[test]
    fn test_flatten_annotations_drops_every_exec_entry() {
        let annotations = vec![
            KeyValue::new("exec", "nodejs:20"),
            KeyValue::new("web-export", true),
            KeyValue::new("exec", "again"),
        ];
        assert_eq!(
            flatten_annotations(&annotations).unwrap(),
            r#"[{"key":"web-export","value":true}]"#
        );
        assert_eq!(flatten_annotations(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_key_values_round_trip_exactly() {
        let input = r#"[{"key":"count","value":9007199254740993},{"key":"a","value":{"z":1.50}},{"key":"a","value":"dup"}]"#;
        let parsed = expand_parameters(input).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(flatten_parameters(&parsed).unwrap(), input);

        let annotations = expand_annotations(input).unwrap();
        assert_eq!(flatten_annotations(&annotations).unwrap(), input);
    }

    #[test]
    fn test_expand_rejects_bad_input() {
        for bad in ["not json", r#"{"key":"a","value":1}"#, r#"[{"value":1}]"#, r#"[1,2]"#] {
            match expand_annotations(bad) {
                Err(ActionError::Parse { field, .. }) => assert_eq!(field, "annotations"),
                other => panic!("Expected parse error for {bad}, got {other:?}"),
            }
        }
    }
}
