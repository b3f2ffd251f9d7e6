//! Integration tests for zipmill-cli.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn zipmill_cmd() -> Command {
    cargo_bin_cmd!("zipmill")
}

/// Creates an archive holding `names` and returns its path.
fn fixture_archive(temp: &TempDir, names: &[&str]) -> std::path::PathBuf {
    let src = temp.path().join("src");
    for name in names {
        let path = src.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("payload {name}")).unwrap();
    }
    let archive = temp.path().join("fixture.zip");
    let mut cmd = zipmill_cmd();
    cmd.arg("create")
        .arg(&archive)
        .arg("--remove-path")
        .arg(&src);
    for name in names {
        cmd.arg(src.join(name));
    }
    cmd.assert().success();
    archive
}

#[test]
fn test_version_flag() {
    zipmill_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zipmill"));
}

#[test]
fn test_help_flag() {
    zipmill_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command-line utility"));
}

#[test]
fn test_extract_help() {
    zipmill_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract archive contents"));
}

#[test]
fn test_create_and_list() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["a.txt", "docs/b.md"]);

    zipmill_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("docs/b.md"))
        .stdout(predicate::str::contains("2 entries"));
}

#[test]
fn test_list_json_emits_one_object_per_entry() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["x.txt", "y.txt"]);

    let output = zipmill_cmd()
        .arg("--json")
        .arg("list")
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let entry_lines: Vec<&str> = stdout
        .lines()
        .filter(|l| l.contains("stored_filename"))
        .collect();
    assert_eq!(entry_lines.len(), 2);
    for line in entry_lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value["stored_filename"].as_str().unwrap().ends_with(".txt"));
    }
}

#[test]
fn test_extract_writes_files() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["deep/nested/file.txt"]);
    let out = temp.path().join("out");

    zipmill_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 entries ok"));

    let restored = out.join("deep/nested/file.txt");
    assert_eq!(
        fs::read_to_string(restored).unwrap(),
        "payload deep/nested/file.txt"
    );
}

#[test]
fn test_extract_to_stdout() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["hello.txt"]);

    zipmill_cmd()
        .arg("extract")
        .arg(&archive)
        .arg("--to-stdout")
        .assert()
        .success()
        .stdout(predicate::eq("payload hello.txt"));
}

#[test]
fn test_delete_by_name() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["keep.txt", "drop.txt"]);

    zipmill_cmd()
        .arg("delete")
        .arg(&archive)
        .arg("--by-name")
        .arg("drop.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep.txt"))
        .stdout(predicate::str::contains("drop.txt").not());

    zipmill_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entries"));
}

#[test]
fn test_extract_by_pattern() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["a.txt", "b.rs"]);
    let out = temp.path().join("filtered");

    zipmill_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .arg("--by-pattern")
        .arg(r"\.txt$")
        .assert()
        .success();

    assert!(out.join("a.txt").exists());
    assert!(!out.join("b.rs").exists());
}

#[test]
fn test_merge_combines_archives() {
    let temp = TempDir::new().unwrap();
    let first = fixture_archive(&temp, &["one.txt"]);

    let other_temp = TempDir::new().unwrap();
    let second = fixture_archive(&other_temp, &["two.txt"]);

    zipmill_cmd()
        .arg("merge")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("merged"));

    zipmill_cmd()
        .arg("list")
        .arg(&first)
        .assert()
        .success()
        .stdout(predicate::str::contains("one.txt"))
        .stdout(predicate::str::contains("two.txt"));
}

#[test]
fn test_list_missing_archive_fails() {
    let temp = TempDir::new().unwrap();
    zipmill_cmd()
        .arg("list")
        .arg(temp.path().join("absent.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_conflicting_selection_flags_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["a.txt"]);

    zipmill_cmd()
        .arg("delete")
        .arg(&archive)
        .arg("--by-name")
        .arg("a.txt")
        .arg("--by-pattern")
        .arg("a")
        .assert()
        .failure();
}

#[test]
fn test_add_appends_entry() {
    let temp = TempDir::new().unwrap();
    let archive = fixture_archive(&temp, &["first.txt"]);
    let extra = temp.path().join("second.txt");
    fs::write(&extra, b"late").unwrap();

    zipmill_cmd()
        .arg("add")
        .arg(&archive)
        .arg(&extra)
        .arg("--remove-all-path")
        .arg("--comment")
        .arg("refreshed")
        .assert()
        .success();

    zipmill_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("second.txt"))
        .stdout(predicate::str::contains("comment: refreshed"));
}
