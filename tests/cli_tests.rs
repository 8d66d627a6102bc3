//! # CLI Integration Tests / CLI 集成测试
//!
//! End-to-end tests that drive the `suite-runner` binary against real suite
//! definitions whose packages run small shell commands.

#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn write_config(temp_dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(file_name);
    fs::write(&path, content).unwrap();
    path
}

fn passing_suite(temp_dir: &TempDir) -> PathBuf {
    write_config(
        temp_dir,
        "passing.toml",
        r#"
name = "cli-suite"
language = "en"

[[packages]]
name = "hello"
command = "echo hello-from-suite"

[[packages]]
name = "goodbye"
command = "echo goodbye"
"#,
    )
}

fn failing_suite(temp_dir: &TempDir) -> PathBuf {
    write_config(
        temp_dir,
        "failing.toml",
        r#"
name = "cli-suite"
language = "en"

[[packages]]
name = "works"
command = "echo fine"

[[packages]]
name = "breaks"
command = "false"
"#,
    )
}

#[test]
fn run_reports_success_for_a_passing_suite() {
    let temp_dir = TempDir::new().unwrap();
    let config = passing_suite(&temp_dir);

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("All packages passed successfully!"))
        .stdout(predicate::str::contains("--- Suite Summary ---"));
}

#[test]
fn run_fails_when_a_package_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = failing_suite(&temp_dir);

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("--- Failure Details ---"))
        .stderr(predicate::str::contains("1 package(s) failed."));
}

#[test]
fn run_with_parallel_jobs_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config = passing_suite(&temp_dir);

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config)
        .arg("--jobs")
        .arg("2");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Running with parallelism 2"))
        .stdout(predicate::str::contains("All packages passed successfully!"));
}

#[test]
fn run_filter_skips_unmatched_packages() {
    let temp_dir = TempDir::new().unwrap();
    // Only "hello" matches; "breaks" never executes, so the run passes.
    let config = write_config(
        &temp_dir,
        "filtered.toml",
        r#"
name = "cli-suite"
language = "en"

[[packages]]
name = "hello"
command = "echo hi"

[[packages]]
name = "breaks"
command = "false"
"#,
    );

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config)
        .arg("--filter")
        .arg("hello");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Skipped"))
        .stdout(predicate::str::contains("All packages passed successfully!"));
}

#[test]
fn run_writes_a_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let config = passing_suite(&temp_dir);
    let report = temp_dir.path().join("report.json");

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .arg(&report);

    cmd.assert().success();

    let contents = fs::read_to_string(&report).unwrap();
    assert!(contents.contains("\"test-run\""));
    assert!(contents.contains("hello"));
}

#[test]
fn run_writes_an_html_report() {
    let temp_dir = TempDir::new().unwrap();
    let config = passing_suite(&temp_dir);
    let report = temp_dir.path().join("report.html");

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config)
        .arg("--html")
        .arg(&report);

    cmd.assert().success();

    let contents = fs::read_to_string(&report).unwrap();
    assert!(contents.contains("<title>Suite Runner Report</title>"));
    assert!(contents.contains("hello"));
}

#[test]
fn explore_lists_packages_without_running_them() {
    let temp_dir = TempDir::new().unwrap();
    // "false" would fail if executed; explore must not run it.
    let config = failing_suite(&temp_dir);

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("explore")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--- Discovered Packages ---"))
        .stdout(predicate::str::contains("works"))
        .stdout(predicate::str::contains("breaks"));
}

#[test]
fn run_rejects_a_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("run")
        .arg("--lang")
        .arg("en")
        .arg("--config")
        .arg("does-not-exist.toml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to locate suite config"));
}

#[test]
fn init_non_interactive_creates_a_starter_config() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("init")
        .arg("--lang")
        .arg("en")
        .arg("--non-interactive");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Created Packages.toml"));

    let contents = fs::read_to_string(temp_dir.path().join("Packages.toml")).unwrap();
    assert!(contents.contains("[[packages]]"));
    assert!(contents.contains("unit-tests"));
}
