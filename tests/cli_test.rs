//! CLI surface tests for the palaver binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    Command::cargo_bin("palaver")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("logout"));
}

#[test]
fn version_matches_package() {
    Command::cargo_bin("palaver")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_fails() {
    Command::cargo_bin("palaver")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn chat_help_shows_login_flags() {
    Command::cargo_bin("palaver")
        .unwrap()
        .args(["chat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--nickname"))
        .stdout(predicate::str::contains("--fresh"));
}

#[test]
fn upload_requires_a_path() {
    Command::cargo_bin("palaver")
        .unwrap()
        .arg("upload")
        .assert()
        .failure();
}
