//! Smoke tests for the taskforge CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn taskforge() -> Command {
    Command::cargo_bin("taskforge").expect("binary builds")
}

fn write_catalog(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("tasks.toml");
    std::fs::write(&path, contents).expect("write catalog");
    path
}

#[test]
fn help_describes_the_subcommands() {
    taskforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("doctor"));
}

#[cfg(unix)]
#[test]
fn passing_catalog_exits_zero() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(
        &dir,
        r#"
[[tasks]]
id = "hello"
command = "echo hello"
"#,
    );

    taskforge()
        .arg("run")
        .arg(&catalog)
        .arg("--project-root")
        .arg(dir.path())
        .arg("--report-dir")
        .arg(dir.path().join("reports"))
        .arg("--fixture-dir")
        .arg(dir.path().join("fixtures"))
        .assert()
        .success()
        .stdout(predicate::str::contains("result: SUCCESS"));

    assert!(dir.path().join("reports").is_dir());
}

#[cfg(unix)]
#[test]
fn failing_task_exits_one() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(
        &dir,
        r#"
[[tasks]]
id = "broken"
command = "exit 1"
"#,
    );

    taskforge()
        .arg("run")
        .arg(&catalog)
        .arg("--project-root")
        .arg(dir.path())
        .arg("--report-dir")
        .arg(dir.path().join("reports"))
        .arg("--fixture-dir")
        .arg(dir.path().join("fixtures"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("result: FAILURE"));
}

#[test]
fn dependency_cycle_exits_three() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(
        &dir,
        r#"
[[tasks]]
id = "a"
command = "true"
dependencies = ["b"]

[[tasks]]
id = "b"
command = "true"
dependencies = ["a"]
"#,
    );

    taskforge()
        .arg("run")
        .arg(&catalog)
        .arg("--project-root")
        .arg(dir.path())
        .arg("--report-dir")
        .arg(dir.path().join("reports"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("circular"));
}

#[test]
fn plan_prints_phases_without_executing() {
    let dir = TempDir::new().expect("tempdir");
    let marker = dir.path().join("ran");
    let catalog = write_catalog(
        &dir,
        &format!(
            r#"
[[tasks]]
id = "first"
command = "touch {marker}"

[[tasks]]
id = "second"
command = "true"
dependencies = ["first"]
"#,
            marker = marker.display()
        ),
    );

    taskforge()
        .arg("plan")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tasks in 2 phases"))
        .stdout(predicate::str::contains("phase 1: first"))
        .stdout(predicate::str::contains("phase 2: second"));

    assert!(!marker.exists(), "plan must not execute tasks");
}

#[test]
fn doctor_reports_missing_tools_with_exit_four() {
    taskforge()
        .arg("doctor")
        .arg("--tool")
        .arg("taskforge-no-such-tool")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("not found in PATH"));
}

#[test]
fn missing_catalog_is_a_config_error() {
    taskforge()
        .arg("run")
        .arg("/nonexistent/tasks.toml")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reading task catalog"));
}
