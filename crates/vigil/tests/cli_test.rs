#![allow(clippy::unwrap_used)]
// Smoke tests for the CLI argument surface. Anything touching the
// network lives behind the core's gateway tests; here we only assert
// the command tree parses and fails cleanly without a service.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_command_tree() {
    Command::cargo_bin("vigil")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("buildings"))
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("panel"));
}

#[test]
fn missing_subcommand_shows_usage() {
    Command::cargo_bin("vigil")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unreachable_server_fails_with_connection_error() {
    Command::cargo_bin("vigil")
        .unwrap()
        .env_remove("VIGIL_SERVER_URL")
        .args([
            "--server",
            "http://127.0.0.1:1", // nothing listens on port 1
            "--timeout",
            "1",
            "panel",
            "status",
        ])
        .assert()
        .failure();
}

#[test]
fn invalid_server_url_is_rejected_locally() {
    Command::cargo_bin("vigil")
        .unwrap()
        .args(["--server", "not a url", "panel", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid server URL"));
}
