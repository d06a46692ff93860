//! The dynamically-typed tree every other module operates on.
//!
//! A [`TreeValue`] is the normalized shape produced by parsing YAML or JSON:
//! string-keyed mappings, ordered sequences, scalars and null. The enum is
//! closed; traversal, mutation and merge all match on it exhaustively.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Entries of a mapping node. Key order is kept for rendering but is not
/// significant for equality.
pub type Mapping = IndexMap<String, TreeValue>;

/// Elements of a sequence node.
pub type Sequence = Vec<TreeValue>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Any node of a configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TreeValue {
    #[default]
    Null,
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
}

/// The concrete kind of a node, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Int => "int",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl Scalar {
    /// The kind of this scalar.
    pub fn kind(&self) -> NodeKind {
        match self {
            Scalar::Bool(_) => NodeKind::Bool,
            Scalar::Int(_) => NodeKind::Int,
            Scalar::Float(_) => NodeKind::Float,
            Scalar::String(_) => NodeKind::String,
        }
    }
}

/// Formats the scalar as plain text: this is what the `string` accessor
/// returns for non-string scalars.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl TreeValue {
    /// An empty mapping.
    pub fn mapping() -> Self {
        TreeValue::Mapping(Mapping::new())
    }

    /// An empty sequence.
    pub fn sequence() -> Self {
        TreeValue::Sequence(Sequence::new())
    }

    /// A sequence of `len` nulls.
    pub fn nulls(len: usize) -> Self {
        TreeValue::Sequence(vec![TreeValue::Null; len])
    }

    /// The concrete kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeValue::Null => NodeKind::Null,
            TreeValue::Scalar(scalar) => scalar.kind(),
            TreeValue::Sequence(_) => NodeKind::Sequence,
            TreeValue::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TreeValue::Null)
    }

    /// True for sequences and mappings.
    pub fn is_container(&self) -> bool {
        matches!(self, TreeValue::Sequence(_) | TreeValue::Mapping(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TreeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            TreeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            TreeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            TreeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            TreeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TreeValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TreeValue::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TreeValue::Scalar(Scalar::Float(x)) => Some(*x),
            TreeValue::Scalar(Scalar::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Look up a direct child by mapping key.
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.as_mapping().and_then(|entries| entries.get(key))
    }
}

impl From<Scalar> for TreeValue {
    fn from(scalar: Scalar) -> Self {
        TreeValue::Scalar(scalar)
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for TreeValue {
    fn from(i: i64) -> Self {
        TreeValue::Scalar(Scalar::Int(i))
    }
}

impl From<i32> for TreeValue {
    fn from(i: i32) -> Self {
        TreeValue::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<u32> for TreeValue {
    fn from(i: u32) -> Self {
        TreeValue::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<f64> for TreeValue {
    fn from(x: f64) -> Self {
        TreeValue::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::Scalar(Scalar::String(s))
    }
}

impl From<Sequence> for TreeValue {
    fn from(items: Sequence) -> Self {
        TreeValue::Sequence(items)
    }
}

impl From<Mapping> for TreeValue {
    fn from(entries: Mapping) -> Self {
        TreeValue::Mapping(entries)
    }
}

impl<T: Into<TreeValue>> From<Option<T>> for TreeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TreeValue::Null, Into::into)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for TreeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeValue::Null => serializer.serialize_unit(),
            TreeValue::Scalar(scalar) => scalar.serialize(serializer),
            TreeValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TreeValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TreeValue::Null.kind().to_string(), "null");
        assert_eq!(TreeValue::from(true).kind().to_string(), "bool");
        assert_eq!(TreeValue::from(1).kind().to_string(), "int");
        assert_eq!(TreeValue::from(1.5).kind().to_string(), "float");
        assert_eq!(TreeValue::from("x").kind().to_string(), "string");
        assert_eq!(TreeValue::sequence().kind().to_string(), "sequence");
        assert_eq!(TreeValue::mapping().kind().to_string(), "mapping");
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Bool(false).to_string(), "false");
        assert_eq!(Scalar::Int(-3).to_string(), "-3");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::Float(3.0).to_string(), "3");
        assert_eq!(Scalar::String("hi".into()).to_string(), "hi");
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let mut a = Mapping::new();
        a.insert("x".into(), TreeValue::from(1));
        a.insert("y".into(), TreeValue::from(2));
        let mut b = Mapping::new();
        b.insert("y".into(), TreeValue::from(2));
        b.insert("x".into(), TreeValue::from(1));
        assert_eq!(TreeValue::Mapping(a), TreeValue::Mapping(b));
    }

    #[test]
    fn test_nulls() {
        let seq = TreeValue::nulls(3);
        assert_eq!(seq.as_sequence().map(Vec::len), Some(3));
        assert!(seq.as_sequence().unwrap().iter().all(TreeValue::is_null));
    }

    #[test]
    fn test_serialize_to_json() {
        let mut entries = Mapping::new();
        entries.insert("a".into(), TreeValue::from(vec![TreeValue::from(1), TreeValue::Null]));
        entries.insert("b".into(), TreeValue::from("x"));
        let json = serde_json::to_string(&TreeValue::Mapping(entries)).unwrap();
        assert_eq!(json, r#"{"a":[1,null],"b":"x"}"#);
    }
}
