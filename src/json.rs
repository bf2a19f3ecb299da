//! JSON string helpers for attributes that carry JSON documents.
//!
//! Numbers are compared by their literal text (serde_json's
//! `arbitrary_precision`), so `1` and `1.0` are different documents while
//! whitespace and object key order never matter.

use serde_json::Value;

/// Whether two strings encode the same JSON document.
///
/// A string that is not JSON is never equivalent to anything.
pub fn equivalent(a: &str, b: &str) -> bool {
    let a = match serde_json::from_str::<Value>(a) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Cannot compare JSON, first value does not parse: {}", e);
            return false;
        }
    };
    let b = match serde_json::from_str::<Value>(b) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Cannot compare JSON, second value does not parse: {}", e);
            return false;
        }
    };
    a == b
}

/// Compact re-serialization with object keys sorted.
///
/// The empty string normalizes to itself.
pub fn normalize(s: &str) -> Result<String, serde_json::Error> {
    if s.is_empty() {
        return Ok(String::new());
    }
    // Map is BTreeMap-backed, so keys come out sorted
    let value: Value = serde_json::from_str(s)?;
    serde_json::to_string(&value)
}

/// Normalize, falling back to the input when it is not JSON.
pub fn normalize_or_raw(s: &str) -> String {
    normalize(s).unwrap_or_else(|_| s.to_string())
}

/// Attribute validator: the value must be a string holding JSON.
pub fn validate(value: &Value) -> Result<(), String> {
    let Some(s) = value.as_str() else {
        return Err("expected a JSON string".to_string());
    };
    serde_json::from_str::<Value>(s)
        .map(|_| ())
        .map_err(|e| format!("invalid JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_and_key_order_do_not_matter() {
        assert!(equivalent(r#"{"a":1,"b":[1,2]}"#, r#"{ "b" : [1, 2], "a" : 1 }"#));
        assert!(equivalent(
            r#"[{"key":"x","value":{"n":true,"m":null}}]"#,
            "[\n  {\"value\": {\"m\": null, \"n\": true}, \"key\": \"x\"}\n]"
        ));
    }

    #[test]
    fn test_structural_differences() {
        assert!(!equivalent("[1,2]", "[2,1]"));
        assert!(!equivalent(r#"{"a":1}"#, r#"{"a":1,"b":2}"#));
        assert!(!equivalent(r#"{"a":"1"}"#, r#"{"a":1}"#));
        assert!(!equivalent("[]", "{}"));
    }

    #[test]
    fn test_numbers_compare_by_literal() {
        assert!(!equivalent("1", "1.0"));
        assert!(equivalent("9007199254740993", " 9007199254740993 "));
        assert!(!equivalent("9007199254740993", "9007199254740992"));
    }

    #[test]
    fn test_non_json_is_never_equivalent() {
        assert!(!equivalent("not json", "not json"));
        assert!(!equivalent("", ""));
        assert!(!equivalent("[]", "{"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(r#"{ "b": 1, "a": [ {"y": 2, "x": 1} ] }"#).unwrap(),
            r#"{"a":[{"x":1,"y":2}],"b":1}"#
        );
        assert_eq!(
            normalize(r#"[{"key":"count","value":9007199254740993}]"#).unwrap(),
            r#"[{"key":"count","value":9007199254740993}]"#
        );
        assert_eq!(normalize("").unwrap(), "");
        assert!(normalize("{").is_err());
    }

    #[test]
    fn test_normalize_or_raw() {
        assert_eq!(normalize_or_raw("[ 1, 2 ]"), "[1,2]");
        assert_eq!(normalize_or_raw("oops"), "oops");
    }

    #[test]
    fn test_validate() {
        assert!(validate(&json!("[]")).is_ok());
        assert!(validate(&json!(r#"[{"key":"a","value":1}]"#)).is_ok());
        assert!(validate(&json!("{oops")).unwrap_err().starts_with("invalid JSON"));
        assert!(validate(&json!(3)).is_err());
    }
}
