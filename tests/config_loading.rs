//! Config file loading and validation.

use std::path::PathBuf;

use runflight::config::{load_and_validate, load_from_path};

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Runflight.toml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn loads_a_minimal_config() {
    let (_dir, path) = write_config(
        r#"
[run]
cmd = "cargo build"
"#,
    );

    let cfg = load_and_validate(&path).expect("valid config");
    assert_eq!(cfg.run.cmd, "cargo build");
    assert_eq!(cfg.run.id, "run");
    assert_eq!(cfg.run.abort_after_ms, None);
}

#[test]
fn loads_all_fields() {
    let (_dir, path) = write_config(
        r#"
[run]
cmd = "sleep 30"
abort_after_ms = 250
id = "nightly-sync"
"#,
    );

    let cfg = load_and_validate(&path).expect("valid config");
    assert_eq!(cfg.run.cmd, "sleep 30");
    assert_eq!(cfg.run.abort_after_ms, Some(250));
    assert_eq!(cfg.run.id, "nightly-sync");
}

#[test]
fn rejects_a_missing_command() {
    let (_dir, path) = write_config(
        r#"
[run]
abort_after_ms = 250
"#,
    );

    let err = load_and_validate(&path).expect_err("empty cmd");
    assert!(err.to_string().contains("cmd"));
}

#[test]
fn rejects_a_zero_deadline() {
    let (_dir, path) = write_config(
        r#"
[run]
cmd = "echo hi"
abort_after_ms = 0
"#,
    );

    let err = load_and_validate(&path).expect_err("zero deadline");
    assert!(err.to_string().contains("abort_after_ms"));
}

#[test]
fn rejects_invalid_toml() {
    let (_dir, path) = write_config("this is === not toml");
    assert!(load_from_path(&path).is_err());
}
