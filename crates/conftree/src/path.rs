//! Path codec: textual or segmented paths into canonical segment lists.
//!
//! A path is an ordered list of segments. Whether a segment is a mapping key
//! or a sequence index is never declared: it is decided by the kind of node
//! found at that depth when the path is resolved.
//!
//! Textual paths use `.` as the separator. A bracket group `[...]` is taken
//! literally (dots inside it do not split) and always forms a segment of its
//! own, so `servers[0].host`, `servers.0.host` and `servers.[0].host` are the
//! same path, and `hosts.[db.internal].port` has `db.internal` as one key.

use crate::error::TreeError;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '.';

/// A canonical path into a tree.
///
/// The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Parse a textual path.
    ///
    /// The empty string and a lone `.` denote the root. A single leading `.`
    /// is ignored; any other empty segment, an empty bracket group, or an
    /// unbalanced bracket is an [`TreeError::InvalidPath`].
    ///
    /// ```
    /// use conftree::Path;
    ///
    /// let path = Path::parse("a.b[3].c").unwrap();
    /// assert_eq!(path.segments(), ["a", "b", "3", "c"]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, TreeError> {
        if text.is_empty() || text == "." {
            return Ok(Path::root());
        }
        let invalid = || TreeError::InvalidPath {
            path: text.to_string(),
        };

        let mut raw: Vec<String> = Vec::new();
        let mut current = String::new();
        // The current segment came from a bracket group and is complete.
        let mut closed = false;
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            match c {
                SEPARATOR => {
                    raw.push(std::mem::take(&mut current));
                    closed = false;
                }
                '[' => {
                    if closed || !current.is_empty() {
                        raw.push(std::mem::take(&mut current));
                    }
                    let mut literal = String::new();
                    let mut terminated = false;
                    for inner in chars.by_ref() {
                        if inner == ']' {
                            terminated = true;
                            break;
                        }
                        literal.push(inner);
                    }
                    if !terminated || literal.is_empty() {
                        return Err(invalid());
                    }
                    current = literal;
                    closed = true;
                }
                ']' => return Err(invalid()),
                _ if closed => return Err(invalid()),
                _ => current.push(c),
            }
        }
        raw.push(current);

        Self::canonicalize(raw).ok_or_else(invalid)
    }

    /// Build a path from an explicit list of segments.
    ///
    /// Segments are taken verbatim (no splitting on `.`). The empty-segment
    /// rule is the same as for [`Path::parse`].
    pub fn from_segments<I, S>(segments: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = segments.into_iter().map(Into::into).collect();
        let text = raw.join(".");
        Self::canonicalize(raw).ok_or(TreeError::InvalidPath { path: text })
    }

    /// Strip one leading empty segment and reject any other.
    fn canonicalize(mut raw: Vec<String>) -> Option<Self> {
        if raw.first().is_some_and(String::is_empty) {
            raw.remove(0);
        }
        if raw.iter().any(String::is_empty) {
            return None;
        }
        Some(Path(raw))
    }

    /// The segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// A new path with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// `self` followed by every segment of `other`.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend(self.0.iter().cloned());
        segments.extend(other.0.iter().cloned());
        Path(segments)
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// The parent path and the last segment, or `None` for the root.
    pub fn split_last(&self) -> Option<(Path, &str)> {
        let (last, rest) = self.0.split_last()?;
        Some((Path(rest.to_vec()), last.as_str()))
    }
}

/// Interpret a segment as a sequence index.
pub(crate) fn as_index(segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok()
}

/// Renders the canonical dotted form. Segments containing `.` or `[` are
/// bracketed so the text parses back to the same path.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if segment.contains(SEPARATOR) || segment.contains('[') {
                write!(f, "[{}]", segment)?;
            } else {
                if i > 0 {
                    f.write_str(".")?;
                }
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Anything that can name a path: dotted text, explicit segment lists, or a
/// [`Path`] itself.
pub trait IntoPath {
    fn into_path(self) -> Result<Path, TreeError>;
}

impl IntoPath for Path {
    fn into_path(self) -> Result<Path, TreeError> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Result<Path, TreeError> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::parse(self)
    }
}

impl IntoPath for &[&str] {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::from_segments(self.iter().copied())
    }
}

impl<const N: usize> IntoPath for [&str; N] {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::from_segments(self)
    }
}

impl IntoPath for Vec<String> {
    fn into_path(self) -> Result<Path, TreeError> {
        Path::from_segments(self)
    }
}
