//! Render command implementation.

use super::{SourceArgs, output_format};
use anyhow::Result;
use conftree::Format;
use tracing::info;

pub fn execute(source: &SourceArgs, format: Option<Format>) -> Result<()> {
    let doc = source.load()?;
    let format = output_format(format, &source.file);
    info!(file = %source.file.display(), format = %format, "Rendering document");
    print!("{}", format.render(doc.root())?);
    Ok(())
}
