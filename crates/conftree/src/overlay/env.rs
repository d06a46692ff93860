//! Environment-variable overlay.

use crate::error::TreeError;
use crate::leaves::leaf_paths;
use crate::path::Path;
use crate::view::Document;
use tracing::debug;

/// Overrides existing leaves from environment variables.
///
/// With prefix `app`, the leaf `db.max-conns` is read from `APP_DB_MAXCONNS`:
/// the prefix and the path segments are upper-cased and joined with `_`, and
/// `-` is dropped.
#[derive(Debug, Clone)]
pub struct EnvOverlay {
    prefix: String,
}

impl EnvOverlay {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = if prefix.is_empty() {
            prefix
        } else {
            format!("{}_", prefix.to_uppercase())
        };
        EnvOverlay { prefix }
    }

    /// The variable name consulted for `path`.
    pub fn key_for(&self, path: &Path) -> String {
        let joined = path.segments().join("_").to_uppercase().replace('-', "");
        format!("{}{}", self.prefix, joined)
    }

    /// Assign every existing leaf whose variable `lookup` returns.
    ///
    /// Values are stored as strings; the typed accessors convert them on
    /// read. Nothing outside the current leaf set is created. Returns the
    /// number of leaves overridden.
    pub fn apply(
        &self,
        doc: &mut Document,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<usize, TreeError> {
        let mut applied = 0;
        for path in leaf_paths(doc.root()) {
            if path.is_empty() {
                continue;
            }
            let key = self.key_for(&path);
            if let Some(value) = lookup(&key) {
                debug!(key = %key, path = %path, "Overriding from environment");
                doc.set(&path, value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// [`EnvOverlay::apply`] against the process environment.
    pub fn apply_from_env(&self, doc: &mut Document) -> Result<usize, TreeError> {
        self.apply(doc, |key| std::env::var(key).ok())
    }

    /// Assign every variable that starts with the prefix, creating nodes.
    ///
    /// The rest of the name is used verbatim as a dotted path, so
    /// `APP_server.hosts.0` sets `server.hosts.0`. Names whose remainder is
    /// not a valid path are skipped.
    pub fn apply_creating(
        &self,
        doc: &mut Document,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<usize, TreeError> {
        let mut applied = 0;
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            let path = match Path::parse(rest) {
                Ok(path) if !path.is_empty() => path,
                _ => {
                    debug!(name = %name, "Skipping variable that is not a valid path");
                    continue;
                }
            };
            doc.set(&path, value)?;
            applied += 1;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::yaml::from_yaml_str;
    use std::collections::HashMap;

    fn doc(text: &str) -> Document {
        Document::new(from_yaml_str(text).unwrap())
    }

    #[test]
    fn test_key_for() {
        let overlay = EnvOverlay::new("app");
        let path = Path::parse("db.max-conns").unwrap();
        assert_eq!(overlay.key_for(&path), "APP_DB_MAXCONNS");
        assert_eq!(EnvOverlay::new("").key_for(&path), "DB_MAXCONNS");
    }

    #[test]
    fn test_apply_overrides_existing_leaves_only() {
        let mut doc = doc("db: {host: local, port: 5432}\nlist: [a, b]");
        let env: HashMap<&str, &str> = [
            ("APP_DB_PORT", "6543"),
            ("APP_LIST_1", "z"),
            ("APP_DB_USER", "ignored"),
        ]
        .into_iter()
        .collect();
        let applied = EnvOverlay::new("app")
            .apply(&mut doc, |k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(doc.view().at("db.port").unwrap().int().unwrap(), 6543);
        assert_eq!(doc.get("list.1").unwrap().as_str(), Some("z"));
        assert!(doc.get("db.user").is_err());
    }

    #[test]
    fn test_apply_creating() {
        let mut tree = doc("a: 1");
        let vars = vec![
            ("APP_server.hosts.1".to_string(), "h".to_string()),
            ("APP_".to_string(), "root".to_string()),
            ("OTHER_x".to_string(), "no".to_string()),
        ];
        let applied = EnvOverlay::new("app").apply_creating(&mut tree, vars).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(tree, doc("a: 1\nserver: {hosts: [~, h]}"));
    }
}
