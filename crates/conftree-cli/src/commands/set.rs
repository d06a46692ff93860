//! Set command implementation.

use super::output_format;
use anyhow::{Context, Result};
use conftree::format::yaml::from_yaml_str;
use conftree::{Document, Format, LoadOptions};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the set command
#[derive(Debug)]
pub struct SetArgs {
    pub file: PathBuf,
    pub path: String,
    /// Parsed as YAML
    pub value: String,
    pub format: Option<Format>,
    pub in_place: bool,
}

pub fn execute(args: SetArgs) -> Result<()> {
    let mut doc = LoadOptions::from_file(&args.file).load()?;
    apply(&mut doc, &args.path, &args.value)?;

    let format = output_format(args.format, &args.file);
    let text = format.render(doc.root())?;
    if args.in_place {
        fs::write(&args.file, text)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        info!(file = %args.file.display(), path = %args.path, "Updated file");
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn apply(doc: &mut Document, path: &str, value: &str) -> Result<()> {
    let value = from_yaml_str(value).with_context(|| format!("Invalid value {:?}", value))?;
    doc.set(path, value)
        .with_context(|| format!("Cannot assign to {:?}", path))?;
    Ok(())
}
