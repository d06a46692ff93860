//! Keys command implementation.

use anyhow::Result;
use conftree::{EnvOverlay, LoadOptions, Path, leaf_paths};
use std::path::Path as FsPath;

/// Print every leaf path of the file, one per line. With a prefix, each
/// line also names the environment variable that overrides the key.
pub fn execute(file: &FsPath, env_prefix: Option<&str>) -> Result<()> {
    let doc = LoadOptions::from_file(file).load()?;
    let overlay = env_prefix.map(EnvOverlay::new);
    for path in leaf_paths(doc.root()) {
        println!("{}", describe(&path, overlay.as_ref()));
    }
    Ok(())
}

fn describe(path: &Path, overlay: Option<&EnvOverlay>) -> String {
    let shown = if path.is_empty() {
        ".".to_string()
    } else {
        path.to_string()
    };
    match overlay {
        Some(overlay) => format!("{}\t{}", shown, overlay.key_for(path)),
        None => shown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let path = Path::parse("db.max-conns").unwrap();
        assert_eq!(describe(&path, None), "db.max-conns");
        assert_eq!(
            describe(&path, Some(&EnvOverlay::new("app"))),
            "db.max-conns\tAPP_DB_MAXCONNS"
        );
        assert_eq!(describe(&Path::root(), None), ".");
    }
}
