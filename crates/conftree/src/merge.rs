//! Structural merge of two trees.
//!
//! Mappings are merged key by key and sequences index by index. Wherever the
//! two sides disagree on kind, or either side is a scalar or null, the
//! overlay wins. A key or index present on only one side is copied from that
//! side. The result is always a fresh tree; neither input is modified.

use crate::value::{Mapping, Sequence, TreeValue};

/// Merge `overlay` over `base`.
///
/// ```
/// use conftree::{merge, format::yaml::from_yaml_str};
///
/// let base = from_yaml_str("{x: 1, y: 2}").unwrap();
/// let overlay = from_yaml_str("{y: 3, z: 4}").unwrap();
/// assert_eq!(merge(&base, &overlay), from_yaml_str("{x: 1, y: 3, z: 4}").unwrap());
/// ```
pub fn merge(base: &TreeValue, overlay: &TreeValue) -> TreeValue {
    match (base, overlay) {
        (TreeValue::Mapping(base), TreeValue::Mapping(overlay)) => {
            TreeValue::Mapping(merge_mappings(base, overlay))
        }
        (TreeValue::Sequence(base), TreeValue::Sequence(overlay)) => {
            TreeValue::Sequence(merge_sequences(base, overlay))
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Merge a list of layers, lowest priority first.
///
/// An empty list yields null.
pub fn merge_all<'a>(layers: impl IntoIterator<Item = &'a TreeValue>) -> TreeValue {
    let mut layers = layers.into_iter();
    let Some(first) = layers.next() else {
        return TreeValue::Null;
    };
    layers.fold(first.clone(), |acc, layer| merge(&acc, layer))
}

fn merge_mappings(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut merged = Mapping::with_capacity(base.len().max(overlay.len()));
    for (key, value) in base {
        let value = match overlay.get(key) {
            Some(over) => merge(value, over),
            None => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    for (key, value) in overlay {
        if !base.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn merge_sequences(base: &Sequence, overlay: &Sequence) -> Sequence {
    let len = base.len().max(overlay.len());
    (0..len)
        .map(|i| match (base.get(i), overlay.get(i)) {
            (Some(b), Some(o)) => merge(b, o),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => TreeValue::Null,
        })
        .collect()
}
