//! Command implementations for the conftree CLI
//!
//! Each command loads a document through [`SourceArgs::load`] or
//! [`conftree::LoadOptions`] and prints to stdout. Log output goes to stderr.

pub mod get;
pub mod keys;
pub mod render;
pub mod set;

use anyhow::{Context, Result};
use clap::Args;
use conftree::{ArgsOverlay, Document, EnvOverlay, Format, LoadOptions, load_with_parents};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the input document is assembled.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// YAML or JSON file
    pub file: PathBuf,

    /// Ignore `parent`/`parents` keys instead of loading those files
    #[arg(long)]
    pub no_inherit: bool,

    /// Override existing keys from PREFIX_<KEY> environment variables
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Key overrides such as `--server-port 8080`, after `--`
    #[arg(last = true, value_name = "OVERRIDES")]
    pub overrides: Vec<String>,
}

impl SourceArgs {
    /// Load the file, then apply environment and argument overrides, in
    /// that order.
    pub fn load(&self) -> Result<Document> {
        let mut doc = if self.no_inherit {
            LoadOptions::from_file(&self.file).load()
        } else {
            load_with_parents(&self.file)
        }
        .with_context(|| format!("Failed to load {}", self.file.display()))?;

        if let Some(prefix) = &self.env_prefix {
            let applied = EnvOverlay::new(prefix.as_str()).apply_from_env(&mut doc)?;
            debug!(prefix = %prefix, applied, "Applied environment overrides");
        }
        if !self.overrides.is_empty() {
            let applied = ArgsOverlay::default().apply(&mut doc, &self.overrides)?;
            debug!(applied, "Applied command-line overrides");
        }
        Ok(doc)
    }
}

/// The explicit format, else the one the file suffix names, else YAML.
pub fn output_format(explicit: Option<Format>, file: &Path) -> Format {
    explicit
        .or_else(|| Format::from_path(file))
        .unwrap_or(Format::Yaml)
}
