//! Overlays that override leaves of a loaded document from the process
//! environment or the command line.

pub mod args;
pub mod env;

pub use args::ArgsOverlay;
pub use env::EnvOverlay;
