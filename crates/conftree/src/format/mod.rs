//! Text formats a tree can be read from and rendered to.

pub mod json;
pub mod yaml;

use crate::error::FormatError;
use crate::value::TreeValue;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A supported serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Detect the format from a file suffix (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?;
        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Some(Format::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Format::Json)
        } else {
            None
        }
    }

    pub fn parse(self, text: &str) -> Result<TreeValue, FormatError> {
        match self {
            Format::Yaml => yaml::from_yaml_str(text),
            Format::Json => json::from_json_str(text),
        }
    }

    /// Render for humans: block-style YAML or indented JSON, ending in a
    /// newline.
    pub fn render(self, tree: &TreeValue) -> Result<String, FormatError> {
        match self {
            Format::Yaml => yaml::to_yaml_string(tree),
            Format::Json => Ok(json::to_json_string_pretty(tree)? + "\n"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}' (expected yaml or json)", other)),
        }
    }
}

/// Parse input of unknown format: YAML first, then JSON.
pub fn parse_any(bytes: &[u8]) -> Result<TreeValue, FormatError> {
    let text = std::str::from_utf8(bytes)?;
    match yaml::from_yaml_str(text) {
        Ok(tree) => Ok(tree),
        Err(yaml_error) => json::from_json_str(text).map_err(|_| yaml_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("b.YML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("b.Json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("b.toml")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("YAML".parse::<Format>(), Ok(Format::Yaml));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_parse_any() {
        let tree = parse_any(br#"{"a": 1}"#).unwrap();
        assert_eq!(tree.get("a"), Some(&TreeValue::from(1)));
        let tree = parse_any(b"a: [x]").unwrap();
        assert!(tree.get("a").is_some_and(TreeValue::is_container));
        assert!(matches!(parse_any(&[0xff, 0xfe]), Err(FormatError::Encoding(_))));
    }
}
