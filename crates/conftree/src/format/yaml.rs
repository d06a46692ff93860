//! YAML reading and writing through `yaml-rust2`.

use crate::error::FormatError;
use crate::value::{Mapping, Scalar, TreeValue};
use tracing::warn;
use yaml_rust2::{Yaml, YamlLoader};

/// Parse YAML text into a tree.
///
/// Empty input is null. Only the first document of a multi-document stream
/// is used. Mapping keys must be strings.
pub fn from_yaml_str(text: &str) -> Result<TreeValue, FormatError> {
    let mut docs = YamlLoader::load_from_str(text)?;
    if docs.len() > 1 {
        warn!(documents = docs.len(), "Ignoring all YAML documents after the first");
    }
    if docs.is_empty() {
        return Ok(TreeValue::Null);
    }
    from_yaml(&docs.swap_remove(0))
}

/// Convert a parsed YAML node.
pub fn from_yaml(yaml: &Yaml) -> Result<TreeValue, FormatError> {
    let value = match yaml {
        Yaml::Null => TreeValue::Null,
        Yaml::Boolean(b) => TreeValue::from(*b),
        Yaml::Integer(i) => TreeValue::from(*i),
        Yaml::Real(text) => match yaml.as_f64() {
            Some(x) => TreeValue::from(x),
            None => return Err(FormatError::UnsupportedNode(format!("real {:?}", text))),
        },
        Yaml::String(s) => TreeValue::from(s.as_str()),
        Yaml::Array(items) => TreeValue::Sequence(
            items
                .iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut entries = Mapping::with_capacity(hash.len());
            for (key, value) in hash {
                let Yaml::String(key) = key else {
                    return Err(FormatError::UnsupportedKey {
                        key: describe_key(key),
                    });
                };
                entries.insert(key.clone(), from_yaml(value)?);
            }
            TreeValue::Mapping(entries)
        }
        Yaml::Alias(_) => return Err(FormatError::UnsupportedNode("alias".to_string())),
        Yaml::BadValue => return Err(FormatError::UnsupportedNode("bad value".to_string())),
    };
    Ok(value)
}

/// Render a tree as a block-style YAML document, without the leading `---`
/// marker.
///
/// Layout follows `YamlEmitter`. Strings are double quoted whenever the plain
/// form would read back as something other than that string.
pub fn to_yaml_string(tree: &TreeValue) -> Result<String, FormatError> {
    let mut out = String::new();
    write_node(&mut out, tree, 0);
    out.push('\n');
    Ok(out)
}

fn write_node(out: &mut String, node: &TreeValue, indent: usize) {
    match node {
        TreeValue::Mapping(entries) if !entries.is_empty() => {
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    newline(out, indent);
                }
                write_string(out, key);
                out.push(':');
                write_child(out, value, false, indent);
            }
        }
        TreeValue::Sequence(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    newline(out, indent);
                }
                out.push('-');
                write_child(out, item, true, indent);
            }
        }
        TreeValue::Mapping(_) => out.push_str("{}"),
        TreeValue::Sequence(_) => out.push_str("[]"),
        TreeValue::Null => out.push('~'),
        TreeValue::Scalar(Scalar::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        TreeValue::Scalar(Scalar::Int(i)) => out.push_str(&i.to_string()),
        TreeValue::Scalar(Scalar::Float(x)) => out.push_str(&format_float(*x)),
        TreeValue::Scalar(Scalar::String(s)) => write_string(out, s),
    }
}

/// A value after `key:` or `-`. Non-empty containers after `-` start on the
/// same line, after `key:` on the next.
fn write_child(out: &mut String, node: &TreeValue, after_dash: bool, indent: usize) {
    let nested = match node {
        TreeValue::Mapping(entries) => !entries.is_empty(),
        TreeValue::Sequence(items) => !items.is_empty(),
        _ => false,
    };
    if nested {
        if after_dash {
            out.push(' ');
        } else {
            newline(out, indent + 2);
        }
        write_node(out, node, indent + 2);
    } else {
        out.push(' ');
        write_node(out, node, indent);
    }
}

fn newline(out: &mut String, indent: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', indent));
}

fn write_string(out: &mut String, s: &str) {
    if !needs_quotes(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Whether a plain scalar would not read back as exactly `s`.
fn needs_quotes(s: &str) -> bool {
    const RESERVED: &[&str] = &[
        "y", "Y", "n", "N", "yes", "Yes", "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off",
        "OFF", "null", "Null", "NULL",
    ];
    s.is_empty()
        || s.starts_with([
            ' ', '&', '*', '?', '|', '-', '<', '>', '=', '!', '%', '@', '.', '\u{feff}',
        ])
        || s.ends_with(' ')
        || s.contains([':', '{', '}', '[', ']', ',', '#', '`', '"', '\'', '\\'])
        || s.chars().any(char::is_control)
        || RESERVED.contains(&s)
        || s.parse::<f64>().is_ok()
        || !matches!(Yaml::from_str(s), Yaml::String(_))
}

/// Float text that YAML reads back as a float, not an integer.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        ".nan".to_string()
    } else if x.is_infinite() {
        let text = if x > 0.0 { ".inf" } else { "-.inf" };
        text.to_string()
    } else {
        let text = x.to_string();
        if text.contains(['.', 'e', 'E']) {
            text
        } else {
            format!("{}.0", text)
        }
    }
}

fn describe_key(key: &Yaml) -> String {
    match key {
        Yaml::Integer(i) => i.to_string(),
        Yaml::Real(r) => r.clone(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        Yaml::Array(_) => "<sequence>".to_string(),
        Yaml::Hash(_) => "<mapping>".to_string(),
        Yaml::String(s) => s.clone(),
        Yaml::Alias(_) | Yaml::BadValue => "<invalid>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let tree = from_yaml_str("a: 1\nb: 1.5\nc: true\nd: hi\ne: ~\nf: '1'").unwrap();
        assert_eq!(tree.get("a"), Some(&TreeValue::from(1)));
        assert_eq!(tree.get("b"), Some(&TreeValue::from(1.5)));
        assert_eq!(tree.get("c"), Some(&TreeValue::from(true)));
        assert_eq!(tree.get("d"), Some(&TreeValue::from("hi")));
        assert_eq!(tree.get("e"), Some(&TreeValue::Null));
        assert_eq!(tree.get("f"), Some(&TreeValue::from("1")));
    }

    #[test]
    fn test_empty_input_is_null() {
        assert_eq!(from_yaml_str("").unwrap(), TreeValue::Null);
        assert_eq!(from_yaml_str("# only a comment\n").unwrap(), TreeValue::Null);
    }

    #[test]
    fn test_non_string_keys_rejected() {
        assert!(matches!(
            from_yaml_str("1: one"),
            Err(FormatError::UnsupportedKey { key }) if key == "1"
        ));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(from_yaml_str("a: [1, 2"), Err(FormatError::Yaml(_))));
    }

    #[test]
    fn test_render_strips_document_marker() {
        let tree = from_yaml_str("name: x\nitems: [1, 2]").unwrap();
        let rendered = to_yaml_string(&tree).unwrap();
        assert!(rendered.starts_with("name: x\n"), "{}", rendered);
        assert!(!rendered.contains("---"));
        assert_eq!(from_yaml_str(&rendered).unwrap(), tree);
    }

    #[test]
    fn test_render_scalar_root() {
        assert_eq!(to_yaml_string(&TreeValue::from(7)).unwrap(), "7\n");
    }

    #[test]
    fn test_render_keeps_types() {
        let tree = from_yaml_str("s: 'true'\nn: '42'\nf: 2.0\nz: ~\ninf: .inf").unwrap();
        let rendered = to_yaml_string(&tree).unwrap();
        assert_eq!(from_yaml_str(&rendered).unwrap(), tree);
    }

    #[test]
    fn test_strings_that_look_like_other_types_are_quoted() {
        let tree = from_yaml_str(
            r#"{k: "0o17", "0o17": 1, inf: "+.inf", hex: "0x1F", plus: "+12", nul: "~", e: "", t: "True"}"#,
        )
        .unwrap();
        let rendered = to_yaml_string(&tree).unwrap();
        assert!(rendered.starts_with("k: \"0o17\"\n\"0o17\": 1\n"), "{}", rendered);
        assert_eq!(from_yaml_str(&rendered).unwrap(), tree);
    }

    #[test]
    fn test_render_layout() {
        let tree = from_yaml_str("a: {b: [1, [2, 3], {c: x, d: {}}]}\ne: []\nf: \"two\\nlines\"").unwrap();
        insta::assert_snapshot!(to_yaml_string(&tree).unwrap().trim_end(), @r#"
        a:
          b:
            - 1
            - - 2
              - 3
            - c: x
              d: {}
        e: []
        f: "two\nlines"
        "#);
    }

    #[test]
    fn test_needs_quotes() {
        for plain in ["x", "hello world", "a-b", "1_000x", "2014-12-31", "inf_x"] {
            assert!(!needs_quotes(plain), "{plain}");
        }
        for quoted in ["", "1", "-1", "1.5", "0o17", "0x1f", "+.inf", ".nan", "yes", "a: b", " x", "\u{7f}"] {
            assert!(needs_quotes(quoted), "{quoted:?}");
        }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.inf");
        assert_eq!(format_float(f64::NAN), ".nan");
    }
}
