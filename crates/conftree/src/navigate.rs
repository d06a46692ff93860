//! Read-only resolution of a path against a tree.

use crate::error::TreeError;
use crate::path::{Path, as_index};
use crate::value::TreeValue;

/// Resolve `path` starting at `root`.
///
/// Each segment is a key when the current node is a mapping and an index when
/// it is a sequence. Scalars and nulls cannot be descended into. Errors carry
/// the prefix of `path` where resolution stopped.
pub fn navigate<'a>(root: &'a TreeValue, path: &Path) -> Result<&'a TreeValue, TreeError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = step(current, segment, path, depth)?;
    }
    Ok(current)
}

/// Mutable counterpart of [`navigate`]. Never creates nodes.
pub fn navigate_mut<'a>(
    root: &'a mut TreeValue,
    path: &Path,
) -> Result<&'a mut TreeValue, TreeError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = match current {
            TreeValue::Mapping(entries) => {
                entries
                    .get_mut(segment)
                    .ok_or_else(|| TreeError::NonexistentKey {
                        path: path.prefix(depth + 1),
                    })?
            }
            TreeValue::Sequence(items) => {
                let len = items.len();
                let index = as_index(segment).ok_or_else(|| TreeError::InvalidIndex {
                    path: path.prefix(depth + 1),
                })?;
                items
                    .get_mut(index)
                    .ok_or_else(|| TreeError::IndexOutOfRange {
                        path: path.prefix(depth + 1),
                        len,
                    })?
            }
            other => {
                return Err(TreeError::WrongNodeKind {
                    path: path.prefix(depth),
                    found: other.kind(),
                });
            }
        };
    }
    Ok(current)
}

/// True when `path` resolves to a node, including an explicit null.
pub fn exists(root: &TreeValue, path: &Path) -> bool {
    navigate(root, path).is_ok()
}

fn step<'a>(
    node: &'a TreeValue,
    segment: &str,
    path: &Path,
    depth: usize,
) -> Result<&'a TreeValue, TreeError> {
    match node {
        TreeValue::Mapping(entries) => entries.get(segment).ok_or_else(|| {
            TreeError::NonexistentKey {
                path: path.prefix(depth + 1),
            }
        }),
        TreeValue::Sequence(items) => {
            let index = as_index(segment).ok_or_else(|| TreeError::InvalidIndex {
                path: path.prefix(depth + 1),
            })?;
            items.get(index).ok_or_else(|| TreeError::IndexOutOfRange {
                path: path.prefix(depth + 1),
                len: items.len(),
            })
        }
        other => Err(TreeError::WrongNodeKind {
            path: path.prefix(depth),
            found: other.kind(),
        }),
    }
}
