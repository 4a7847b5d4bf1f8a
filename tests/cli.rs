//! End-to-end tests for the argtree binary

mod common;

use assert_cmd::Command;
use common::{create_test_declaration, create_test_declaration_in_subdir, TOOL_DECLARATION};
use predicates::prelude::*;

fn argtree() -> Command {
    let mut cmd = Command::cargo_bin("argtree").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_parse_prints_resolved_values() {
    let (_temp_dir, path) = create_test_declaration(TOOL_DECLARATION);

    argtree()
        .arg("-f")
        .arg(&path)
        .args(["parse", "--", "-x", "4", "ci", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command: tool"))
        .stdout(predicate::str::contains("xx: 4"))
        .stdout(predicate::str::contains("command: run"))
        .stdout(predicate::str::contains("fast: true"))
        .stdout(predicate::str::contains("- a.txt"));
}

#[test]
fn test_parse_error_exit_code() {
    let (_temp_dir, path) = create_test_declaration(TOOL_DECLARATION);

    argtree()
        .arg("-f")
        .arg(&path)
        .args(["parse", "--", "--bogus", "run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: no such option: --bogus"));
}

#[test]
fn test_parse_help_succeeds() {
    let (_temp_dir, path) = create_test_declaration(TOOL_DECLARATION);

    argtree()
        .arg("-f")
        .arg(&path)
        .args(["parse", "--", "run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: tool run"))
        .stdout(predicate::str::contains("--level"));
}

#[test]
fn test_parse_missing_subcommand_prints_help_as_error() {
    let (_temp_dir, path) = create_test_declaration(TOOL_DECLARATION);

    argtree()
        .arg("-f")
        .arg(&path)
        .arg("parse")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn test_completion_bash() {
    let (_temp_dir, path) = create_test_declaration(TOOL_DECLARATION);

    argtree()
        .arg("-f")
        .arg(&path)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/usr/bin/env bash"))
        .stdout(predicate::str::contains("_tool_run()"))
        .stdout(predicate::str::ends_with("complete -F _tool tool"));
}

#[test]
fn test_check_discovers_declaration() {
    let (_temp_dir, _path, sub_dir) = create_test_declaration_in_subdir(TOOL_DECLARATION);

    argtree()
        .current_dir(&sub_dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid:"))
        .stdout(predicate::str::contains("ci -> run --fast"));
}

#[test]
fn test_check_invalid_declaration() {
    let (_temp_dir, path) = create_test_declaration(
        "name: tool\noptions:\n  - names: [--level]\n    choices: [a, b]\n    default: c\n",
    );

    argtree()
        .arg("-f")
        .arg(&path)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load command declarations"));
}

#[test]
fn test_self_completion() {
    argtree()
        .args(["self-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("argtree"));
}
