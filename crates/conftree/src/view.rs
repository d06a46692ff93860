//! Cursors over a tree.
//!
//! A [`Document`] owns a tree. A [`View`] borrows a node of some tree and
//! remembers the absolute path it was reached by, so navigation never copies
//! data. A [`ViewMut`] is the in-place editing counterpart used when no
//! [`Source`] is involved.
//!
//! Views taken from a [`Snapshot`] carry the [`Source`] they came from;
//! `set` on such a view is queued for the background updater instead of
//! touching the snapshot.

use crate::assign::{assign, remove};
use crate::chain::{Chain, ErrorPolicy};
use crate::coerce::Coerce;
use crate::error::TreeError;
use crate::merge::merge;
use crate::navigate::{navigate, navigate_mut};
use crate::path::{IntoPath, Path};
use crate::source::{Command, Source, SourceOptions};
use crate::value::{Mapping, NodeKind, TreeValue};
use indexmap::IndexMap;
use std::time::Duration;

/// An owned configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: TreeValue,
}

impl Document {
    pub fn new(root: TreeValue) -> Self {
        Document { root }
    }

    pub fn root(&self) -> &TreeValue {
        &self.root
    }

    pub fn into_inner(self) -> TreeValue {
        self.root
    }

    /// A read cursor at the root.
    pub fn view(&self) -> View<'_> {
        View::new(&self.root)
    }

    /// An editing cursor at the root.
    pub fn view_mut(&mut self) -> ViewMut<'_> {
        ViewMut {
            node: &mut self.root,
            path: Path::root(),
        }
    }

    /// Resolve `path` from the root.
    pub fn get(&self, path: impl IntoPath) -> Result<&TreeValue, TreeError> {
        navigate(&self.root, &path.into_path()?)
    }

    /// Assign in place, creating missing nodes.
    pub fn set(
        &mut self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        assign(&mut self.root, &path.into_path()?, value.into())
    }

    /// Remove the node at `path` and return it.
    pub fn remove(&mut self, path: impl IntoPath) -> Result<TreeValue, TreeError> {
        remove(&mut self.root, &path.into_path()?)
    }

    /// Merge `overlay` over this tree; the overlay wins on conflicts.
    pub fn merge(&mut self, overlay: &TreeValue) {
        self.root = merge(&self.root, overlay);
    }

    /// Hand the tree to a background updater.
    ///
    /// Must be called from within a tokio runtime.
    pub fn into_source(self, options: SourceOptions) -> Source {
        Source::new(self.root, options)
    }
}

impl From<TreeValue> for Document {
    fn from(root: TreeValue) -> Self {
        Document { root }
    }
}

/// A read cursor: a borrowed node plus the absolute path that reached it.
#[derive(Debug, Clone)]
pub struct View<'a> {
    node: &'a TreeValue,
    path: Path,
    source: Option<Source>,
}

impl<'a> View<'a> {
    /// A detached view at the root of `tree`.
    pub fn new(tree: &'a TreeValue) -> Self {
        View {
            node: tree,
            path: Path::root(),
            source: None,
        }
    }

    pub(crate) fn attached(tree: &'a TreeValue, source: Source) -> Self {
        View {
            node: tree,
            path: Path::root(),
            source: Some(source),
        }
    }

    /// Navigate to a descendant. Errors name the failing prefix relative to
    /// the root, not to this view.
    pub fn at(&self, path: impl IntoPath) -> Result<View<'a>, TreeError> {
        let relative = path.into_path()?;
        let node = navigate(self.node, &relative).map_err(|e| e.rebase(&self.path))?;
        Ok(View {
            node,
            path: self.path.join(&relative),
            source: self.source.clone(),
        })
    }

    /// Resolve a descendant without building a view.
    pub fn get(&self, path: impl IntoPath) -> Result<&'a TreeValue, TreeError> {
        navigate(self.node, &path.into_path()?).map_err(|e| e.rebase(&self.path))
    }

    /// True if `path` resolves, including to an explicit null.
    pub fn exists(&self, path: impl IntoPath) -> bool {
        self.get(path).is_ok()
    }

    /// The node this view points at.
    pub fn value(&self) -> &'a TreeValue {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    /// Path from the root of the tree this view was taken from.
    pub fn absolute_path(&self) -> &Path {
        &self.path
    }

    /// [`View::absolute_path`] extended by a relative path.
    pub fn absolute_path_plus(&self, relative: impl IntoPath) -> Result<Path, TreeError> {
        Ok(self.path.join(&relative.into_path()?))
    }

    /// The source this view was published by, if any.
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn coerce<T: Coerce>(&self) -> Result<T, TreeError> {
        T::coerce(self.node, &self.path)
    }

    pub fn bool(&self) -> Result<bool, TreeError> {
        self.coerce()
    }

    pub fn int(&self) -> Result<i64, TreeError> {
        self.coerce()
    }

    pub fn float(&self) -> Result<f64, TreeError> {
        self.coerce()
    }

    pub fn string(&self) -> Result<String, TreeError> {
        self.coerce()
    }

    pub fn duration(&self) -> Result<Duration, TreeError> {
        self.coerce()
    }

    /// Coerce the node at `path`, or return `default` on any failure.
    pub fn get_or<T: Coerce>(&self, path: impl IntoPath, default: T) -> T {
        self.at(path)
            .and_then(|view| view.coerce())
            .unwrap_or(default)
    }

    /// The elements of a sequence node.
    pub fn list(&self) -> Result<&'a [TreeValue], TreeError> {
        match self.node {
            TreeValue::Sequence(items) => Ok(items),
            other => Err(self.mismatch("sequence", other)),
        }
    }

    /// The entries of a mapping node.
    pub fn map(&self) -> Result<&'a Mapping, TreeError> {
        match self.node {
            TreeValue::Mapping(entries) => Ok(entries),
            other => Err(self.mismatch("mapping", other)),
        }
    }

    /// One view per sequence element.
    pub fn list_views(&self) -> Result<Vec<View<'a>>, TreeError> {
        Ok(self
            .list()?
            .iter()
            .enumerate()
            .map(|(i, node)| self.child(i.to_string(), node))
            .collect())
    }

    /// One view per mapping entry.
    pub fn map_views(&self) -> Result<IndexMap<&'a str, View<'a>>, TreeError> {
        Ok(self
            .map()?
            .iter()
            .map(|(key, node)| (key.as_str(), self.child(key.as_str(), node)))
            .collect())
    }

    /// Coerce every sequence element. Fails on the first bad element.
    pub fn list_of<T: Coerce>(&self) -> Result<Vec<T>, TreeError> {
        self.list()?
            .iter()
            .enumerate()
            .map(|(i, node)| T::coerce(node, &self.path.child(i.to_string())))
            .collect()
    }

    /// Coerce every mapping value. Fails on the first bad entry.
    pub fn map_of<T: Coerce>(&self) -> Result<IndexMap<String, T>, TreeError> {
        self.map()?
            .iter()
            .map(|(key, node)| {
                T::coerce(node, &self.path.child(key.as_str())).map(|value| (key.clone(), value))
            })
            .collect()
    }

    pub fn list_bool(&self) -> Result<Vec<bool>, TreeError> {
        self.list_of()
    }

    pub fn list_int(&self) -> Result<Vec<i64>, TreeError> {
        self.list_of()
    }

    pub fn list_float(&self) -> Result<Vec<f64>, TreeError> {
        self.list_of()
    }

    pub fn list_string(&self) -> Result<Vec<String>, TreeError> {
        self.list_of()
    }

    pub fn list_duration(&self) -> Result<Vec<Duration>, TreeError> {
        self.list_of()
    }

    pub fn map_bool(&self) -> Result<IndexMap<String, bool>, TreeError> {
        self.map_of()
    }

    pub fn map_int(&self) -> Result<IndexMap<String, i64>, TreeError> {
        self.map_of()
    }

    pub fn map_float(&self) -> Result<IndexMap<String, f64>, TreeError> {
        self.map_of()
    }

    pub fn map_string(&self) -> Result<IndexMap<String, String>, TreeError> {
        self.map_of()
    }

    pub fn map_duration(&self) -> Result<IndexMap<String, Duration>, TreeError> {
        self.map_of()
    }

    /// An independent copy of the addressed subtree.
    pub fn deep_copy(&self) -> Document {
        Document::new(self.node.clone())
    }

    /// Wrap this view in an error-policy chain.
    pub fn chain(self, policy: ErrorPolicy) -> Chain<'a> {
        Chain::new(self, policy)
    }

    /// Queue an assignment relative to this view.
    ///
    /// Waits while the command queue is full. Fails with
    /// [`TreeError::NoSource`] on a detached view; use [`Document::set`] or
    /// [`ViewMut::set`] to edit an owned tree in place.
    pub async fn set(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        let command = self.set_command(path, value)?;
        self.attached_source()?.send(command).await
    }

    /// Like [`View::set`] but fails with [`TreeError::QueueFull`] instead of
    /// waiting.
    pub fn try_set(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        let command = self.set_command(path, value)?;
        self.attached_source()?.try_send(command)
    }

    /// Like [`View::set`] for callers outside the async runtime.
    pub fn blocking_set(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        let command = self.set_command(path, value)?;
        self.attached_source()?.blocking_send(command)
    }

    /// Queue removal of a node relative to this view.
    pub async fn delete(&self, path: impl IntoPath) -> Result<(), TreeError> {
        let path = self.absolute_path_plus(path)?;
        self.attached_source()?.send(Command::Delete { path }).await
    }

    fn set_command(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<Command, TreeError> {
        Ok(Command::Set {
            path: self.absolute_path_plus(path)?,
            value: value.into(),
        })
    }

    fn attached_source(&self) -> Result<&Source, TreeError> {
        self.source.as_ref().ok_or(TreeError::NoSource)
    }

    fn child(&self, segment: impl Into<String>, node: &'a TreeValue) -> View<'a> {
        View {
            node,
            path: self.path.child(segment),
            source: self.source.clone(),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &TreeValue) -> TreeError {
        TreeError::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: found.kind(),
        }
    }
}

/// An editing cursor into an owned tree.
#[derive(Debug)]
pub struct ViewMut<'a> {
    node: &'a mut TreeValue,
    path: Path,
}

impl<'a> ViewMut<'a> {
    /// Navigate to an existing descendant.
    pub fn at(self, path: impl IntoPath) -> Result<ViewMut<'a>, TreeError> {
        let relative = path.into_path()?;
        let base = self.path;
        let node = navigate_mut(self.node, &relative).map_err(|e| e.rebase(&base))?;
        Ok(ViewMut {
            node,
            path: base.join(&relative),
        })
    }

    pub fn value(&self) -> &TreeValue {
        &*self.node
    }

    /// A read cursor over the same node.
    pub fn view(&self) -> View<'_> {
        View {
            node: &*self.node,
            path: self.path.clone(),
            source: None,
        }
    }

    pub fn absolute_path(&self) -> &Path {
        &self.path
    }

    /// Assign in place relative to this cursor, creating missing nodes.
    pub fn set(
        &mut self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        let relative = path.into_path()?;
        assign(self.node, &relative, value.into()).map_err(|e| e.rebase(&self.path))
    }

    /// Remove a descendant in place and return it.
    pub fn remove(&mut self, path: impl IntoPath) -> Result<TreeValue, TreeError> {
        let relative = path.into_path()?;
        remove(self.node, &relative).map_err(|e| e.rebase(&self.path))
    }
}
