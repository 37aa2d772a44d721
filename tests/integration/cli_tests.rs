//! CLI integration tests
//!
//! Exercise the binary end to end through assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("intermediarygen").unwrap()
}

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_generate_from_symbol_dump() {
    let dir = TempDir::new().unwrap();
    let symbols = dir.path().join("symbols.json");
    let counter = dir.path().join("counter.txt");
    let output = dir.path().join("names.json");

    fs::write(
        &symbols,
        r#"[
            {
                "class": {
                    "id": "a",
                    "kind": "Class",
                    "name": "a",
                    "obfuscated": true,
                    "mapped_name": null,
                    "matched": null,
                    "hierarchy": ["a"]
                },
                "methods": [],
                "fields": []
            }
        ]"#,
    )
    .unwrap();

    cmd()
        .arg("generate")
        .arg("--symbols")
        .arg(&symbols)
        .arg("--counter-file")
        .arg(&counter)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("net/minecraft/class_1"));

    let names = fs::read_to_string(&output).unwrap();
    assert!(names.contains("net/minecraft/class_1"));

    let counters = fs::read_to_string(&counter).unwrap();
    assert!(counters.contains("# INTERMEDIARY-COUNTER class 2"));
}

#[test]
fn test_generate_continued_with_missing_counter_file_fails() {
    let dir = TempDir::new().unwrap();
    let symbols = dir.path().join("symbols.json");
    fs::write(&symbols, "[]").unwrap();

    cmd()
        .arg("generate")
        .arg("--symbols")
        .arg(&symbols)
        .arg("--counter-file")
        .arg(dir.path().join("missing.txt"))
        .arg("--continued")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_setup_missing_manifest_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg("setup")
        .arg("--manifest-a")
        .arg(dir.path().join("absent.json"))
        .arg("--manifest-b")
        .arg(dir.path().join("absent.json"))
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn test_setup_resolves_minimal_project() {
    let dir = TempDir::new().unwrap();
    // Empty manifests: nothing to resolve, setup still completes.
    let manifest = dir.path().join("empty.json");
    fs::write(&manifest, "{}").unwrap();
    let output = dir.path().join("project.json");

    cmd()
        .arg("setup")
        .arg("--manifest-a")
        .arg(&manifest)
        .arg("--manifest-b")
        .arg(&manifest)
        .arg("--dir")
        .arg(dir.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let project = fs::read_to_string(&output).unwrap();
    assert!(project.contains("shared_classpath"));
}
