//! JSON reading and writing through `serde_json`.

use crate::error::FormatError;
use crate::leaves::leaf_paths;
use crate::navigate::navigate;
use crate::value::{Mapping, Scalar, TreeValue};
use serde_json::Value;

/// Parse JSON text into a tree.
pub fn from_json_str(text: &str) -> Result<TreeValue, FormatError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(TreeValue::from(value))
}

/// Render compact JSON.
///
/// JSON has no NaN or infinity, so a tree holding one fails with
/// [`FormatError::NonFiniteFloat`].
pub fn to_json_string(tree: &TreeValue) -> Result<String, FormatError> {
    check_finite(tree)?;
    Ok(serde_json::to_string(tree)?)
}

/// Render indented JSON. Fails like [`to_json_string`].
pub fn to_json_string_pretty(tree: &TreeValue) -> Result<String, FormatError> {
    check_finite(tree)?;
    Ok(serde_json::to_string_pretty(tree)?)
}

fn check_finite(tree: &TreeValue) -> Result<(), FormatError> {
    for path in leaf_paths(tree) {
        if let Ok(TreeValue::Scalar(Scalar::Float(x))) = navigate(tree, &path) {
            if !x.is_finite() {
                return Err(FormatError::NonFiniteFloat { path, value: *x });
            }
        }
    }
    Ok(())
}

/// Integers that fit `i64` stay integers; every other number becomes a float.
impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeValue::Null,
            Value::Bool(b) => TreeValue::from(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => TreeValue::from(i),
                None => n.as_f64().map_or(TreeValue::Null, TreeValue::from),
            },
            Value::String(s) => TreeValue::from(s),
            Value::Array(items) => {
                TreeValue::Sequence(items.into_iter().map(TreeValue::from).collect())
            }
            Value::Object(entries) => TreeValue::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, TreeValue::from(v)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::yaml::from_yaml_str;

    #[test]
    fn test_json_and_yaml_agree() {
        let json = from_json_str(r#"{"a": [1, 2.5, "x", null, true], "b": {"c": {}}}"#).unwrap();
        let yaml = from_yaml_str("a: [1, 2.5, x, ~, true]\nb: {c: {}}").unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let tree = from_json_str("18446744073709551615").unwrap();
        assert!(matches!(tree, TreeValue::Scalar(crate::value::Scalar::Float(_))));
    }

    #[test]
    fn test_render() {
        let tree = from_json_str(r#"{"b": 1, "a": [true]}"#).unwrap();
        assert_eq!(to_json_string(&tree).unwrap(), r#"{"a":[true],"b":1}"#);
        assert!(to_json_string_pretty(&tree).unwrap().contains("\n  \"b\": 1"));
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let tree = from_yaml_str("a: {b: [1.5, .nan]}").unwrap();
        let err = to_json_string(&tree).unwrap_err();
        assert_eq!(err.to_string(), r#"Can't render NaN at "a.b.1" as JSON"#);
        assert!(to_json_string_pretty(&from_yaml_str("-.inf").unwrap()).is_err());
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(from_json_str("{"), Err(FormatError::Json(_))));
    }
}
