//! Common test utilities
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A small tree exercising options, arguments, aliases and subcommands
pub const TOOL_DECLARATION: &str = r#"
name: tool
help: Demo tool
version: "0.3.0"
options:
  - names: [-x, --xx]
    type: int
    default: 111
  - names: [--color]
    secondary_names: [--no-color]
    type: bool
    default: true
    completion: none
aliases:
  ci: [run, --fast]
subcommands:
  - name: run
    help: Run something
    options:
      - names: [--fast]
        nvalues: 0
      - names: [--level]
        choices: [low, high]
        default: low
    arguments:
      - name: targets
        nvalues: -1
        required: false
        completion: path
"#;

/// Create a temporary directory with an argtree.yml file
pub fn create_test_declaration(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("argtree.yml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// Create a declaration with an empty subdirectory next to it
pub fn create_test_declaration_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("argtree.yml");
    let sub_dir = temp_dir.path().join("subdir");

    fs::write(&path, content).unwrap();
    fs::create_dir(&sub_dir).unwrap();

    (temp_dir, path, sub_dir)
}
