//! Get command implementation.

use super::{SourceArgs, output_format};
use anyhow::{Context, Result};
use conftree::{Format, TreeValue};

/// Print the node at `path`: scalars as plain text, everything else
/// rendered in the output format.
pub fn execute(source: &SourceArgs, path: &str, format: Option<Format>) -> Result<()> {
    let doc = source.load()?;
    let node = doc
        .get(path)
        .with_context(|| format!("No value at {:?} in {}", path, source.file.display()))?;
    print!("{}", format_node(node, output_format(format, &source.file))?);
    Ok(())
}

fn format_node(node: &TreeValue, format: Format) -> Result<String> {
    match node {
        TreeValue::Scalar(scalar) => Ok(format!("{}\n", scalar)),
        other => Ok(format.render(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_print_plain() {
        assert_eq!(format_node(&TreeValue::from("x y"), Format::Json).unwrap(), "x y\n");
        assert_eq!(format_node(&TreeValue::from(2.5), Format::Yaml).unwrap(), "2.5\n");
    }

    #[test]
    fn test_containers_use_the_format() {
        let list = TreeValue::Sequence(vec![TreeValue::from(1)]);
        assert_eq!(format_node(&list, Format::Yaml).unwrap(), "- 1\n");
        assert!(format_node(&list, Format::Json).unwrap().starts_with('['));
    }
}
