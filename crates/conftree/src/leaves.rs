//! Leaf path enumeration, used by the overlays to know which keys exist.

use crate::path::Path;
use crate::value::TreeValue;

/// Every path that ends at a scalar, a null, or an empty container.
///
/// Paths come out depth first in document order. A scalar root yields the
/// single empty path.
pub fn leaf_paths(tree: &TreeValue) -> Vec<Path> {
    let mut leaves = Vec::new();
    collect(tree, &mut Path::root(), &mut leaves);
    leaves
}

fn collect(node: &TreeValue, prefix: &mut Path, leaves: &mut Vec<Path>) {
    match node {
        TreeValue::Mapping(entries) if !entries.is_empty() => {
            for (key, child) in entries {
                prefix.push(key.as_str());
                collect(child, prefix, leaves);
                prefix.pop();
            }
        }
        TreeValue::Sequence(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                prefix.push(i.to_string());
                collect(child, prefix, leaves);
                prefix.pop();
            }
        }
        _ => leaves.push(prefix.clone()),
    }
}
