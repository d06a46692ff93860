//! Path-addressable configuration trees.
//!
//! A configuration is a [`TreeValue`]: nested mappings and sequences with
//! scalar or null leaves. Nodes are addressed by a [`Path`] of segments,
//! written as dotted text (`server.hosts.0`, `labels.[app.kubernetes.io/name]`).
//!
//! # Architecture
//!
//! - [`navigate`] / [`assign`] / [`remove`]: pure read and in-place write by
//!   path. Assignment creates missing nodes, choosing a sequence when the
//!   next segment is an index and a mapping otherwise.
//! - [`View`]: a read cursor with typed accessors (`int`, `duration`,
//!   `list_string`, ...). [`Chain`] wraps a view for fluent reads with an
//!   [`ErrorPolicy`] and fallbacks.
//! - [`merge`]: structural merge where the overlay wins.
//! - [`Source`]: hands a tree to a background task that applies queued
//!   [`Command`]s in batches and publishes immutable [`Snapshot`]s.
//! - [`format`], [`overlay`] and [`loader`]: YAML/JSON, environment and
//!   command-line overrides, and file inheritance.
//!
//! # Example
//!
//! ```
//! use conftree::{Document, format::yaml::from_yaml_str};
//!
//! let mut doc = Document::new(from_yaml_str("server: {port: 80}").unwrap());
//! doc.set("server.hosts.1", "b.example").unwrap();
//!
//! let server = doc.view().at("server").unwrap();
//! assert_eq!(server.at("port").unwrap().int().unwrap(), 80);
//! assert_eq!(server.at("hosts").unwrap().list().unwrap().len(), 2);
//! ```

mod assign;
mod chain;
mod coerce;
mod duration;
mod error;
mod leaves;
mod merge;
mod navigate;
mod path;
mod source;
mod value;
mod view;

pub mod format;
pub mod loader;
pub mod overlay;

pub use assign::{MAX_SEQUENCE_LEN, assign, remove};
pub use chain::{Chain, ErrorPolicy};
pub use coerce::{Coerce, parse_bool};
pub use duration::parse_duration;
pub use error::{FormatError, LoadError, TreeError};
pub use leaves::leaf_paths;
pub use merge::{merge, merge_all};
pub use navigate::{exists, navigate, navigate_mut};
pub use path::{IntoPath, Path};
pub use source::{
    Command,
    DEFAULT_QUEUE_CAPACITY,
    DEFAULT_UPDATE_PERIOD,
    Snapshot,
    Source,
    SourceOptions,
};
pub use value::{Mapping, NodeKind, Scalar, Sequence, TreeValue};
pub use view::{Document, View, ViewMut};

pub use format::Format;
pub use loader::{LoadOptions, load_with_parents};
pub use overlay::{ArgsOverlay, EnvOverlay};
