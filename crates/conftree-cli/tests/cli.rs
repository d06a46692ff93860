use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn conftree(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_conftree"));
    command.args(args).env("RUST_LOG", "off");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_get_scalar_and_subtree() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "app.yaml", "server: {port: 80, hosts: [a, b]}");

    assert_eq!(stdout(&conftree(&["get", &file, "server.port"], &[])), "80\n");
    assert_eq!(
        stdout(&conftree(&["get", &file, "server.hosts"], &[])),
        "- a\n- b\n"
    );
    assert!(!conftree(&["get", &file, "server.missing"], &[]).status.success());
}

#[test]
fn test_overrides_apply_in_order() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "app.yaml", "server: {port: 80, host: local}");

    let output = conftree(
        &["get", "--env-prefix", "cli_test", &file, "server", "--", "--server-port", "9090"],
        &[("CLI_TEST_SERVER_PORT", "8080"), ("CLI_TEST_SERVER_HOST", "remote")],
    );
    assert_eq!(stdout(&output), "port: \"9090\"\nhost: remote\n");
}

#[test]
fn test_render_follows_parents() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.json", r#"{"a": 1, "b": 1}"#);
    let file = write(dir.path(), "child.yaml", "parent: base.json\nb: 2");

    assert_eq!(stdout(&conftree(&["render", &file], &[])), "a: 1\nb: 2\n");
    assert_eq!(
        stdout(&conftree(&["render", "--no-inherit", &file], &[])),
        "parent: base.json\nb: 2\n"
    );
}

#[test]
fn test_keys_lists_leaves() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "app.yaml", "db: {max-conns: 5}\nlist: [x]");

    assert_eq!(
        stdout(&conftree(&["keys", &file, "--env-prefix", "app"], &[])),
        "db.max-conns\tAPP_DB_MAXCONNS\nlist.0\tAPP_LIST_0\n"
    );
}

#[test]
fn test_set_in_place() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "app.json", r#"{"a": 1}"#);

    stdout(&conftree(&["set", &file, "b.0", "true", "--in-place"], &[]));
    let text = fs::read_to_string(&file).unwrap();
    assert!(text.contains("\"b\": [\n    true\n  ]"), "{}", text);
}
