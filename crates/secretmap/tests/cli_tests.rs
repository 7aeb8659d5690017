//! End-to-end tests for the secretmap binary
//!
//! None of these inputs reference secrets, so no AWS access is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Binary with a clean environment and the CLI backend forced
fn secretmap() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("secretmap").unwrap();
    for var in [
        "SECRETMAP_FORMAT",
        "SECRETMAP_OUT",
        "SECRETMAP_ENV",
        "SECRETMAP_STRICT",
        "SECRETMAP_CONCURRENCY",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("SECRETMAP_AWS_MODE", "cli");
    cmd
}

#[test]
fn test_help_lists_identifier_grammar() {
    secretmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sm:aws:json:<secret-name>"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_no_files_is_usage_error() {
    secretmap().assert().failure().code(2);
}

#[test]
fn test_plain_file_as_json() {
    secretmap()
        .arg(fixture("plain.json"))
        .assert()
        .success()
        .stdout(r#"{"APP_NAME":"secretmap","PORT":8080,"DEBUG":true}"#);
}

#[test]
fn test_later_files_win_as_dotenv() {
    secretmap()
        .args(["-f", "dotenv"])
        .arg(fixture("plain.json"))
        .arg(fixture("override.json"))
        .assert()
        .success()
        .stdout("APP_NAME=secretmap\nPORT=9090\nDEBUG=true\nGREETING='hello world'\n");
}

#[test]
fn test_env_section_as_exports() {
    secretmap()
        .args(["-f", "exports", "-e", "staging"])
        .arg(fixture("nested.json"))
        .assert()
        .success()
        .stdout("export APP_NAME=secretmap-staging\nexport LOG_LEVEL=debug\n");
}

#[test]
fn test_format_from_environment() {
    secretmap()
        .env("SECRETMAP_FORMAT", "docker")
        .arg(fixture("override.json"))
        .assert()
        .success()
        .stdout("ENV PORT=9090\nENV GREETING='hello world'\n");
}

#[test]
fn test_nested_without_env_fails() {
    secretmap()
        .arg(fixture("nested.json"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "invalid values for keys: production, staging",
        ));
}

#[test]
fn test_missing_file_fails() {
    secretmap()
        .arg("/nonexistent/secretmap.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("/nonexistent/secretmap.json"));
}

#[test]
fn test_strict_rejects_plain_values() {
    secretmap()
        .arg("--strict")
        .arg(fixture("override.json"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Could not find a scheme for '9090'"));
}

#[test]
fn test_json_error_envelope() {
    secretmap()
        .args(["--json", "--level", "error"])
        .arg(fixture("nested.json"))
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains(r#""status":"error""#))
        .stdout(predicate::str::contains(r#""code":"config""#));
}

#[test]
fn test_stdin_input() {
    secretmap()
        .args(["-f", "dotenv", "-"])
        .write_stdin(r#"{"FROM_STDIN": "yes"}"#)
        .assert()
        .success()
        .stdout("FROM_STDIN=yes\n");
}

#[test]
fn test_out_writes_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("app.env");

    secretmap()
        .args(["-f", "dotenv", "-o"])
        .arg(&out)
        .arg(fixture("override.json"))
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "PORT=9090\nGREETING='hello world'\n"
    );
}
