//! Error types for tree access, formats and loading.

use crate::path::Path;
use crate::value::NodeKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from navigating, mutating or coercing a tree.
///
/// Every variant that concerns a location carries the path prefix at which
/// the failure was detected, not the full requested path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Invalid path {path:?}")]
    InvalidPath { path: String },

    #[error("Invalid list index at \"{path}\"")]
    InvalidIndex { path: Path },

    #[error("Index out of range at \"{path}\": list has only {len} items")]
    IndexOutOfRange { path: Path, len: usize },

    #[error("Index too large at \"{path}\": lists are limited to {max} items")]
    IndexTooLarge { path: Path, max: usize },

    #[error("Nonexistent map key at \"{path}\"")]
    NonexistentKey { path: Path },

    #[error("Cannot descend into {found} at \"{path}\"")]
    WrongNodeKind { path: Path, found: NodeKind },

    #[error("Invalid type at \"{path}\": expected {expected}; got {found}")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: NodeKind,
    },

    #[error("Value {value} at \"{path}\" can't be converted to int")]
    NotIntegral { path: Path, value: f64 },

    #[error("Can't parse {input:?} at \"{path}\" as {target}")]
    ParseFailure {
        path: Path,
        target: &'static str,
        input: String,
    },

    #[error("View has no source to apply updates to")]
    NoSource,

    #[error("Command queue is full")]
    QueueFull,

    #[error("Source updater has shut down")]
    SourceClosed,
}

impl TreeError {
    /// The path prefix this error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TreeError::InvalidIndex { path }
            | TreeError::IndexOutOfRange { path, .. }
            | TreeError::IndexTooLarge { path, .. }
            | TreeError::NonexistentKey { path }
            | TreeError::WrongNodeKind { path, .. }
            | TreeError::TypeMismatch { path, .. }
            | TreeError::NotIntegral { path, .. }
            | TreeError::ParseFailure { path, .. } => Some(path),
            TreeError::InvalidPath { .. }
            | TreeError::NoSource
            | TreeError::QueueFull
            | TreeError::SourceClosed => None,
        }
    }

    /// Prefix the carried path with `base`, turning a path relative to some
    /// sub-node into one relative to the root.
    pub(crate) fn rebase(mut self, base: &Path) -> Self {
        if base.is_empty() {
            return self;
        }
        match &mut self {
            TreeError::InvalidIndex { path }
            | TreeError::IndexOutOfRange { path, .. }
            | TreeError::IndexTooLarge { path, .. }
            | TreeError::NonexistentKey { path }
            | TreeError::WrongNodeKind { path, .. }
            | TreeError::TypeMismatch { path, .. }
            | TreeError::NotIntegral { path, .. }
            | TreeError::ParseFailure { path, .. } => *path = base.join(path),
            TreeError::InvalidPath { .. }
            | TreeError::NoSource
            | TreeError::QueueFull
            | TreeError::SourceClosed => {}
        }
        self
    }
}

/// Errors from reading or writing a serialized tree.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("YAML syntax error: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported mapping key {key} (keys must be strings)")]
    UnsupportedKey { key: String },

    #[error("Unsupported YAML node: {0}")]
    UnsupportedNode(String),

    #[error("Can't render {value} at \"{path}\" as JSON")]
    NonFiniteFloat { path: Path, value: f64 },

    #[error("Input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Errors from assembling a tree out of files, environment and arguments.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Unknown config file suffix: {}", .0.display())]
    UnknownSuffix(PathBuf),

    #[error("Cyclic config inheritance: {}", display_chain(chain))]
    CyclicInheritance { chain: Vec<PathBuf> },

    #[error("Invalid parent reference in {}: expected string or list of strings, got {found}", file.display())]
    InvalidParent { file: PathBuf, found: NodeKind },

    #[error("Invalid command line arguments: {0}")]
    Args(#[from] clap::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error_messages() {
        let path = Path::parse("servers.3").unwrap();
        insta::assert_snapshot!(
            TreeError::IndexOutOfRange { path: path.clone(), len: 2 },
            @r#"Index out of range at "servers.3": list has only 2 items"#
        );
        insta::assert_snapshot!(
            TreeError::TypeMismatch { path, expected: "int", found: NodeKind::String },
            @r#"Invalid type at "servers.3": expected int; got string"#
        );
        insta::assert_snapshot!(
            TreeError::InvalidPath { path: "a..b".into() },
            @r#"Invalid path "a..b""#
        );
    }

    #[test]
    fn test_rebase_prefixes_path() {
        let err = TreeError::NonexistentKey {
            path: Path::parse("b").unwrap(),
        };
        let rebased = err.rebase(&Path::parse("a").unwrap());
        assert_eq!(rebased.path(), Some(&Path::parse("a.b").unwrap()));
        assert_eq!(TreeError::NoSource.rebase(&Path::parse("a").unwrap()), TreeError::NoSource);
    }

    #[test]
    fn test_cycle_message() {
        let err = LoadError::CyclicInheritance {
            chain: vec!["a.yaml".into(), "b.yaml".into(), "a.yaml".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic config inheritance: a.yaml -> b.yaml -> a.yaml"
        );
    }
}
