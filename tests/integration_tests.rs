//! Integration tests for the apidiff CLI.
//!
//! These tests run the binary end to end: argument parsing, document
//! loading, comparison, report output and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to create a Command for the apidiff binary
fn apidiff() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("apidiff"))
}

#[test]
fn test_identical_documents_exit_0() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-1.0.xml")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No changes detected."));
}

#[test]
fn test_changes_exit_1() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Removed type: UIKit.UILegacyControl"))
        .stderr(predicate::str::contains(
            "Summary: 4 added, 1 removed, 4 modified (3 breaking)",
        ));
}

#[test]
fn test_fail_on_breaking_exit_3() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .arg("--fail-on-breaking")
        .assert()
        .code(3);
}

#[test]
fn test_markdown_format() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .args(["-f", "markdown", "--title", "UIKit 2.0"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("# UIKit 2.0\n"))
        .stdout(predicate::str::contains("#### New Type: UIKit.UIHoverStyle"))
        .stdout(predicate::str::contains("```diff"));
}

#[test]
fn test_ignore_flags() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .args(["--ignore-new", "UIHoverStyle", "--ignore-removed", "Legacy"])
        .arg("--ignore-nonbreaking")
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("UIHoverStyle").not())
        .stdout(predicate::str::contains("UILegacyControl").not())
        .stdout(predicate::str::contains("WillEnterRegion"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_output_file() {
    let output = NamedTempFile::new().unwrap();
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .args(["-f", "html", "-o"])
        .arg(output.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(output.path()).unwrap();
    assert!(html.starts_with("<h1>API diff</h1>"));
}

#[test]
fn test_file_not_found_exit_2() {
    apidiff()
        .arg("tests/fixtures/nonexistent.xml")
        .arg("tests/fixtures/uikit-1.0.xml")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("nonexistent.xml"));
}

#[test]
fn test_malformed_document_names_location() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"<assemblies><assembly name="Lib"><namespaces><namespace /></namespaces></assembly></assemblies>"#
    )
    .unwrap();

    apidiff()
        .arg(file.path())
        .arg("tests/fixtures/uikit-1.0.xml")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Missing 'name' attribute on <namespace> in assembly Lib",
        ));
}

#[test]
fn test_invalid_ignore_pattern_exit_2() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .args(["--ignore-added", "("])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid ignore pattern"));
}

#[test]
fn test_unknown_format_rejected() {
    apidiff()
        .arg("tests/fixtures/uikit-1.0.xml")
        .arg("tests/fixtures/uikit-2.0.xml")
        .args(["-f", "pdf"])
        .assert()
        .failure();
}
