//! Reading documents from files or bytes, and resolving `parent`/`parents`
//! inheritance between files.

use crate::error::{FormatError, LoadError};
use crate::format::{Format, parse_any};
use crate::merge::merge;
use crate::value::{Scalar, TreeValue};
use crate::view::Document;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use tracing::{debug, info};

/// Key naming a single parent file.
pub const PARENT_KEY: &str = "parent";
/// Key naming a list of parent files.
pub const PARENTS_KEY: &str = "parents";

#[derive(Debug, Clone)]
enum Input {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// Where to read a document from and how to parse it.
///
/// Files use the format their suffix names unless one is set explicitly.
/// Bytes without an explicit format are tried as YAML, then as JSON.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    input: Input,
    format: Option<Format>,
}

impl LoadOptions {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        LoadOptions {
            input: Input::File(path.into()),
            format: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        LoadOptions {
            input: Input::Bytes(bytes.into()),
            format: None,
        }
    }

    /// Override format detection.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn load(&self) -> Result<Document, LoadError> {
        match &self.input {
            Input::File(path) => {
                let format = self
                    .format
                    .or_else(|| Format::from_path(path))
                    .ok_or_else(|| LoadError::UnknownSuffix(path.clone()))?;
                let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), format = %format, "Loading config file");
                let tree = format.parse(&text).map_err(|source| LoadError::Parse {
                    path: path.clone(),
                    source,
                })?;
                Ok(Document::new(tree))
            }
            Input::Bytes(bytes) => {
                let tree = match self.format {
                    Some(format) => {
                        let text = std::str::from_utf8(bytes).map_err(FormatError::from)?;
                        format.parse(text)?
                    }
                    None => parse_any(bytes)?,
                };
                Ok(Document::new(tree))
            }
        }
    }
}

/// Load `path` and every file it inherits from.
///
/// `parent` (a file name) and `parents` (a list of file names) are resolved
/// relative to the directory of the file that declares them. Parents are
/// merged in order, `parent` first, each one overriding the ones before it,
/// and the declaring file is merged over the result. Both keys are removed
/// from the returned document.
///
/// A file that is its own ancestor fails with
/// [`LoadError::CyclicInheritance`]. Two parents sharing an ancestor is fine.
pub fn load_with_parents(path: impl AsRef<FsPath>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let mut ancestry = Vec::new();
    let tree = resolve(path, &mut ancestry)?;
    info!(path = %path.display(), "Resolved config inheritance");
    Ok(Document::new(tree))
}

fn resolve(path: &FsPath, ancestry: &mut Vec<PathBuf>) -> Result<TreeValue, LoadError> {
    let canonical = fs::canonicalize(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(start) = ancestry.iter().position(|seen| *seen == canonical) {
        let mut chain = ancestry[start..].to_vec();
        chain.push(canonical);
        return Err(LoadError::CyclicInheritance { chain });
    }

    let mut tree = LoadOptions::from_file(&canonical).load()?.into_inner();
    let parents = take_parents(&mut tree, &canonical)?;
    if parents.is_empty() {
        return Ok(tree);
    }

    let dir = canonical
        .parent()
        .map(FsPath::to_path_buf)
        .unwrap_or_default();
    ancestry.push(canonical);
    let mut base = TreeValue::Null;
    for parent in parents {
        let parent_path = dir.join(&parent);
        debug!(parent = %parent_path.display(), "Inheriting from parent");
        let parent_tree = resolve(&parent_path, ancestry)?;
        base = merge(&base, &parent_tree);
    }
    ancestry.pop();

    Ok(merge(&base, &tree))
}

/// Remove the inheritance keys from a mapping root and return the named
/// files, `parent` first.
fn take_parents(tree: &mut TreeValue, file: &FsPath) -> Result<Vec<String>, LoadError> {
    let Some(entries) = tree.as_mapping_mut() else {
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for key in [PARENT_KEY, PARENTS_KEY] {
        if let Some(value) = entries.shift_remove(key) {
            names.extend(parent_names(value, file)?);
        }
    }
    Ok(names)
}

fn parent_names(value: TreeValue, file: &FsPath) -> Result<Vec<String>, LoadError> {
    let invalid = |found: &TreeValue| LoadError::InvalidParent {
        file: file.to_path_buf(),
        found: found.kind(),
    };
    match value {
        TreeValue::Null => Ok(Vec::new()),
        TreeValue::Scalar(Scalar::String(name)) => Ok(vec![name]),
        TreeValue::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                TreeValue::Scalar(Scalar::String(name)) => Ok(name),
                other => Err(invalid(&other)),
            })
            .collect(),
        other => Err(invalid(&other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_detects_format_from_suffix() {
        let dir = TempDir::new().unwrap();
        let yaml = write(&dir, "a.yml", "x: 1");
        let json = write(&dir, "b.json", r#"{"x": 2}"#);
        assert_eq!(
            LoadOptions::from_file(&yaml).load().unwrap().get("x").unwrap(),
            &TreeValue::from(1)
        );
        assert_eq!(
            LoadOptions::from_file(&json).load().unwrap().get("x").unwrap(),
            &TreeValue::from(2)
        );
    }

    #[test]
    fn test_load_unknown_suffix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.conf", "x: 1");
        assert!(matches!(
            LoadOptions::from_file(&path).load(),
            Err(LoadError::UnknownSuffix(_))
        ));
        let doc = LoadOptions::from_file(&path)
            .format(Format::Yaml)
            .load()
            .unwrap();
        assert_eq!(doc.get("x").unwrap(), &TreeValue::from(1));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoadOptions::from_file("/nonexistent/conftree.yaml")
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", "{");
        let err = LoadOptions::from_file(&path).load().unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_bytes_with_explicit_format() {
        let doc = LoadOptions::from_bytes("[1, 2]")
            .format(Format::Json)
            .load()
            .unwrap();
        assert_eq!(doc.get("1").unwrap(), &TreeValue::from(2));
    }

    #[test]
    fn test_bytes_not_utf8() {
        let err = LoadOptions::from_bytes(vec![b'a', b':', 0xff])
            .format(Format::Yaml)
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::Format(FormatError::Encoding(_))));
        assert!(err.to_string().starts_with("Input is not valid UTF-8"));
    }

    #[test]
    fn test_invalid_parent_reference() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "child.yaml", "parent: {a: 1}");
        assert!(matches!(
            load_with_parents(&path),
            Err(LoadError::InvalidParent { .. })
        ));
    }

    #[test]
    fn test_null_parent_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "child.yaml", "parent: ~\nx: 1");
        let doc = load_with_parents(&path).unwrap();
        assert_eq!(doc, Document::new(crate::format::yaml::from_yaml_str("x: 1").unwrap()));
    }
}
