use conftree::{Document, LoadError, LoadOptions, format::yaml::from_yaml_str, load_with_parents};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

fn yaml(text: &str) -> Document {
    Document::new(from_yaml_str(text).unwrap())
}

#[test]
fn test_child_overrides_parent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "server: {host: base, port: 80}\nlog: info");
    let child = write(dir.path(), "child.yaml", "parent: base.yaml\nserver: {port: 8080}");

    let doc = load_with_parents(&child).unwrap();
    assert_eq!(doc, yaml("server: {host: base, port: 8080}\nlog: info"));
}

#[test]
fn test_later_parents_override_earlier_ones() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "first.yaml", "a: first\nb: first\nc: first");
    write(dir.path(), "second.yaml", "b: second\nc: second");
    write(dir.path(), "third.json", r#"{"c": "third"}"#);
    let child = write(
        dir.path(),
        "child.yaml",
        "parent: first.yaml\nparents: [second.yaml, third.json]",
    );

    let doc = load_with_parents(&child).unwrap();
    assert_eq!(doc, yaml("a: first\nb: second\nc: third"));
}

#[test]
fn test_parents_resolve_relative_to_the_declaring_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared/root.yaml", "level: root\nroot: true");
    write(dir.path(), "shared/mid.yaml", "parent: root.yaml\nlevel: mid");
    let child = write(dir.path(), "app/child.yaml", "parent: ../shared/mid.yaml\nlevel: child");

    let doc = load_with_parents(&child).unwrap();
    assert_eq!(doc, yaml("level: child\nroot: true"));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "common.yaml", "common: 1\nside: none");
    write(dir.path(), "left.yaml", "parent: common.yaml\nleft: true");
    write(dir.path(), "right.yaml", "parent: common.yaml\nright: true");
    let child = write(dir.path(), "child.yaml", "parents: [left.yaml, right.yaml]");

    let doc = load_with_parents(&child).unwrap();
    assert_eq!(doc, yaml("common: 1\nside: none\nleft: true\nright: true"));
}

#[test]
fn test_cycle_is_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "parent: b.yaml\nx: 1");
    write(dir.path(), "b.yaml", "parent: c.yaml");
    write(dir.path(), "c.yaml", "parent: a.yaml");
    let a = dir.path().join("a.yaml");

    let err = load_with_parents(&a).unwrap_err();
    let LoadError::CyclicInheritance { chain } = &err else {
        panic!("expected a cycle error, got {err}");
    };
    let names: Vec<_> = chain
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.yaml", "b.yaml", "c.yaml", "a.yaml"]);
    assert!(err.to_string().contains(" -> "));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "self.yaml", "parent: ./self.yaml");
    assert!(matches!(
        load_with_parents(&path),
        Err(LoadError::CyclicInheritance { chain }) if chain.len() == 2
    ));
}

#[test]
fn test_missing_parent_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let child = write(dir.path(), "child.yaml", "parent: gone.yaml");
    assert!(matches!(load_with_parents(&child), Err(LoadError::Io { .. })));
}

#[test]
fn test_plain_load_keeps_inheritance_keys() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.yaml", "a: 1");
    let child = write(dir.path(), "child.yaml", "parent: base.yaml\nb: 2");

    let doc = LoadOptions::from_file(&child).load().unwrap();
    assert_eq!(doc, yaml("parent: base.yaml\nb: 2"));
}

#[test]
fn test_bytes_loader_guesses_format() {
    let doc = LoadOptions::from_bytes(r#"{"a": {"b": [1, 2]}}"#).load().unwrap();
    assert_eq!(doc.view().at("a.b").unwrap().list_int().unwrap(), [1, 2]);

    let doc = LoadOptions::from_bytes("a:\n  b: [3]\n").load().unwrap();
    assert_eq!(doc.view().at("a.b.0").unwrap().int().unwrap(), 3);

    assert!(LoadOptions::from_bytes(vec![0xff, 0x00]).load().is_err());
}
