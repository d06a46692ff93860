//! In-place mutation with lookahead autovivification.
//!
//! Missing intermediate nodes are created on the way down. The kind of a new
//! container is chosen from the segment that will be applied to it: a segment
//! that parses as a non-negative integer `i` produces a sequence of `i + 1`
//! nulls, anything else produces an empty mapping. Sequences are extended with
//! nulls when an index lands past their end, up to [`MAX_SEQUENCE_LEN`]
//! elements.

use crate::error::TreeError;
use crate::navigate::navigate_mut;
use crate::path::{Path, as_index};
use crate::value::TreeValue;

/// Largest length a sequence may be grown to by assignment.
pub const MAX_SEQUENCE_LEN: usize = 1 << 20;

/// Store `value` at `path`, creating whatever is missing along the way.
///
/// The empty path replaces the whole tree. Fails without touching `root` if
/// the path runs into a scalar, uses a non-integer segment on an existing
/// sequence, or would grow a sequence past [`MAX_SEQUENCE_LEN`].
pub fn assign(root: &mut TreeValue, path: &Path, value: TreeValue) -> Result<(), TreeError> {
    check_assignable(root, path)?;

    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        if current.is_null() {
            *current = container_for(segment);
        }
        current = match current {
            TreeValue::Mapping(entries) => entries.entry(segment.to_string()).or_default(),
            TreeValue::Sequence(items) => {
                let index = as_index(segment).ok_or_else(|| TreeError::InvalidIndex {
                    path: path.prefix(depth + 1),
                })?;
                if index >= items.len() {
                    items.resize(index + 1, TreeValue::Null);
                }
                &mut items[index]
            }
            other => {
                return Err(TreeError::WrongNodeKind {
                    path: path.prefix(depth),
                    found: other.kind(),
                });
            }
        };
    }
    *current = value;
    Ok(())
}

/// Remove the node at `path` and return it.
///
/// Removing a sequence element shifts the following elements down. Removing
/// the root leaves a null tree.
pub fn remove(root: &mut TreeValue, path: &Path) -> Result<TreeValue, TreeError> {
    let Some((parent_path, last)) = path.split_last() else {
        return Ok(std::mem::take(root));
    };
    let parent = navigate_mut(root, &parent_path)?;
    match parent {
        TreeValue::Mapping(entries) => entries
            .shift_remove(last)
            .ok_or_else(|| TreeError::NonexistentKey { path: path.clone() }),
        TreeValue::Sequence(items) => {
            let index =
                as_index(last).ok_or_else(|| TreeError::InvalidIndex { path: path.clone() })?;
            if index >= items.len() {
                return Err(TreeError::IndexOutOfRange {
                    path: path.clone(),
                    len: items.len(),
                });
            }
            Ok(items.remove(index))
        }
        other => Err(TreeError::WrongNodeKind {
            path: parent_path,
            found: other.kind(),
        }),
    }
}

fn container_for(segment: &str) -> TreeValue {
    match as_index(segment) {
        // Bounded by check_assignable.
        Some(index) => TreeValue::nulls(index + 1),
        None => TreeValue::mapping(),
    }
}

/// Walk the existing part of the tree and report the first conflict.
///
/// Once the walk reaches a null or a missing child everything below is
/// created fresh. Only the size of the new sequences can fail from there.
fn check_assignable(root: &TreeValue, path: &Path) -> Result<(), TreeError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = match current {
            TreeValue::Null => return check_fresh(path, depth),
            TreeValue::Mapping(entries) => match entries.get(segment) {
                Some(child) => child,
                None => return check_fresh(path, depth + 1),
            },
            TreeValue::Sequence(items) => {
                let index = as_index(segment).ok_or_else(|| TreeError::InvalidIndex {
                    path: path.prefix(depth + 1),
                })?;
                match items.get(index) {
                    Some(child) => child,
                    None => {
                        check_growth(path, depth, index)?;
                        return check_fresh(path, depth + 1);
                    }
                }
            }
            TreeValue::Scalar(scalar) => {
                return Err(TreeError::WrongNodeKind {
                    path: path.prefix(depth),
                    found: scalar.kind(),
                });
            }
        };
    }
    Ok(())
}

/// Every index segment from `from` on creates a sequence long enough to hold it.
fn check_fresh(path: &Path, from: usize) -> Result<(), TreeError> {
    for (depth, segment) in path.iter().enumerate().skip(from) {
        if let Some(index) = as_index(segment) {
            check_growth(path, depth, index)?;
        }
    }
    Ok(())
}

fn check_growth(path: &Path, depth: usize, index: usize) -> Result<(), TreeError> {
    if index < MAX_SEQUENCE_LEN {
        Ok(())
    } else {
        Err(TreeError::IndexTooLarge {
            path: path.prefix(depth + 1),
            max: MAX_SEQUENCE_LEN,
        })
    }
}
