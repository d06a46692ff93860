//! Command-line overlay built with clap's builder API.

use crate::error::LoadError;
use crate::leaves::leaf_paths;
use crate::navigate::navigate;
use crate::path::Path;
use crate::value::TreeValue;
use crate::view::Document;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Overrides existing leaves from `--<path-joined-with-hyphens> <value>`
/// options.
///
/// One option is generated per leaf of the document, so `--help` lists every
/// overridable key with its current value. A leaf named `help` takes over
/// that option. Only options actually given on the command line are applied.
#[derive(Debug, Clone)]
pub struct ArgsOverlay {
    name: String,
}

impl Default for ArgsOverlay {
    fn default() -> Self {
        ArgsOverlay::new("conftree")
    }
}

impl ArgsOverlay {
    /// `name` is used in help and error output.
    pub fn new(name: impl Into<String>) -> Self {
        ArgsOverlay { name: name.into() }
    }

    /// The option name for `path`.
    pub fn flag_for(path: &Path) -> String {
        path.segments().join("-")
    }

    /// Build the clap command for the leaves of `doc`, together with the
    /// path each option id stands for.
    pub fn command(&self, doc: &Document) -> (Command, IndexMap<String, Path>) {
        let mut flags: IndexMap<String, Path> = IndexMap::new();
        let mut command = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true);

        for path in leaf_paths(doc.root()) {
            if path.is_empty() {
                continue;
            }
            let flag = Self::flag_for(&path);
            if flag.is_empty() || flag.starts_with('-') || flag.contains(['=', ' ']) {
                warn!(path = %path, "Key can't be used as an option name");
                continue;
            }
            if let Some(existing) = flags.get(&flag) {
                warn!(flag = %flag, first = %existing, skipped = %path, "Two keys map to the same option");
                continue;
            }
            let mut arg = Arg::new(flag.clone())
                .long(flag.clone())
                .action(ArgAction::Set)
                .value_name("VALUE")
                .help(format!("Override {}", path));
            if let Ok(TreeValue::Scalar(current)) = navigate(doc.root(), &path) {
                arg = arg.default_value(current.to_string());
            }
            command = command.arg(arg);
            flags.insert(flag, path);
        }
        if !flags.contains_key("help") {
            command = command.arg(
                Arg::new("help")
                    .long("help")
                    .action(ArgAction::Help)
                    .help("Print help"),
            );
        }
        (command, flags)
    }

    /// Parse `args` (without the program name) and assign the values given.
    ///
    /// Returns the number of leaves overridden.
    pub fn apply<I, T>(&self, doc: &mut Document, args: I) -> Result<usize, LoadError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let (command, flags) = self.command(doc);
        let matches = command.try_get_matches_from(args)?;

        let mut applied = 0;
        for (flag, path) in &flags {
            if matches.value_source(flag) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(value) = matches.get_one::<String>(flag) {
                debug!(flag = %flag, path = %path, "Overriding from command line");
                doc.set(path, value.clone())?;
                applied += 1;
            }
        }
        Ok(applied)
    }
}
