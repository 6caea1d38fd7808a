//! CLI integration tests for logmodel.
//!
//! These tests write JSON-lines build logs to temporary directories and run
//! the binary against them.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A successful one-project build with one warning.
const GOOD_LOG: &str = r#"{"kind":"build-started","timestamp":"2024-01-01T00:00:00Z","environment":{"PATH":"C:\\Windows"}}
{"kind":"project-started","timestamp":"2024-01-01T00:00:01Z","context":{"node_id":0,"project_context_id":1},"project_file":"C:\\src\\App\\App.csproj","target_names":"Build"}
{"kind":"target-started","timestamp":"2024-01-01T00:00:02Z","context":{"node_id":0,"project_context_id":1,"target_id":1},"target_name":"Build"}
{"kind":"task-started","timestamp":"2024-01-01T00:00:03Z","context":{"node_id":0,"project_context_id":1,"target_id":1,"task_id":1},"task_name":"Csc"}
{"kind":"warning","timestamp":"2024-01-01T00:00:04Z","context":{"node_id":0,"project_context_id":1,"target_id":1,"task_id":1},"text":"The variable 'e' is declared but never used","diagnostic":{"code":"CS0168","file":"Program.cs","line":5,"column":13}}
{"kind":"task-finished","timestamp":"2024-01-01T00:00:05Z","context":{"node_id":0,"project_context_id":1,"target_id":1,"task_id":1},"task_name":"Csc","succeeded":true}
{"kind":"target-finished","timestamp":"2024-01-01T00:00:06Z","context":{"node_id":0,"project_context_id":1,"target_id":1},"target_name":"Build","succeeded":true}
{"kind":"project-finished","timestamp":"2024-01-01T00:00:07Z","context":{"node_id":0,"project_context_id":1},"project_file":"C:\\src\\App\\App.csproj","succeeded":true}

{"kind":"build-finished","timestamp":"2024-01-01T00:00:08Z","succeeded":true}
"#;

/// A message for a project that never started.
const ORPHAN_MESSAGE: &str = r#"{"kind":"message","timestamp":"2024-01-01T00:00:03Z","context":{"node_id":0,"project_context_id":42},"text":"lost"}
"#;

/// Get the logmodel binary command, isolated from the user's config.
fn logmodel(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("logmodel").unwrap();
    cmd.env("HOME", home.path()).current_dir(home.path());
    cmd
}

/// Write `contents` as `build.jsonl` in a fresh temporary directory.
fn write_log(contents: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("build.jsonl");
    fs::write(&path, contents).unwrap();
    (tmp, path)
}

/// `GOOD_LOG` with one orphan message inserted after the project started.
fn broken_log() -> String {
    let mut lines: Vec<&str> = GOOD_LOG.lines().collect();
    lines.insert(2, ORPHAN_MESSAGE.trim_end());
    lines.join("\n") + "\n"
}

// ============================================================================
// logmodel show
// ============================================================================

#[test]
fn test_show_prints_tree() {
    let (tmp, log) = write_log(GOOD_LOG);

    logmodel(&tmp)
        .arg("show")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::eq(
            "Build succeeded in 8.00s\n  Project App.csproj [1] succeeded\n    Target Build * succeeded\n      Task Csc succeeded\n",
        ));
}

#[test]
fn test_show_with_messages() {
    let (tmp, log) = write_log(GOOD_LOG);

    logmodel(&tmp)
        .args(["show", "--messages"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "warning CS0168: The variable 'e' is declared but never used (Program.cs(5,13))",
        ));
}

#[test]
fn test_show_json() {
    let (tmp, log) = write_log(GOOD_LOG);

    let output = logmodel(&tmp)
        .args(["show", "--format", "json"])
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["build"]["result"], "succeeded");
    assert_eq!(json["build"]["project"]["file"], "C:\\src\\App\\App.csproj");
    assert_eq!(
        json["build"]["project"]["targets"][0]["tasks"][0]["name"],
        "Csc"
    );
}

#[test]
fn test_show_uses_project_config() {
    let (tmp, log) = write_log(GOOD_LOG);
    fs::create_dir_all(tmp.path().join(".logmodel")).unwrap();
    fs::write(
        tmp.path().join(".logmodel/config.toml"),
        "[output]\nformat = \"json\"\n",
    )
    .unwrap();

    logmodel(&tmp)
        .arg("show")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"build\":"));
}

#[test]
fn test_show_rejects_unknown_format() {
    let (tmp, log) = write_log(GOOD_LOG);

    logmodel(&tmp)
        .args(["show", "--format", "xml"])
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format `xml`"));
}

#[test]
fn test_show_fails_on_model_errors() {
    let (tmp, log) = write_log(&broken_log());

    logmodel(&tmp)
        .arg("show")
        .arg(&log)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "1 error(s) while building the log model",
        ));
}

#[test]
fn test_show_lenient_prints_recovered_model() {
    let (tmp, log) = write_log(&broken_log());

    logmodel(&tmp)
        .args(["show", "--lenient"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project App.csproj [1] succeeded"))
        .stderr(predicate::str::contains("logmodel check"));
}

#[test]
fn test_show_missing_file() {
    let tmp = TempDir::new().unwrap();

    logmodel(&tmp)
        .args(["show", "missing.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read build log"))
        .stderr(predicate::str::contains("JSON-lines"));
}

#[test]
fn test_show_reports_bad_line() {
    let (tmp, log) = write_log("{\"kind\":\"build-started\",\"timestamp\":\"2024-01-01T00:00:00Z\"}\nnot json\n");

    logmodel(&tmp)
        .arg("show")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2: invalid build event"));
}

// ============================================================================
// logmodel check
// ============================================================================

#[test]
fn test_check_clean_log() {
    let (tmp, log) = write_log(GOOD_LOG);

    logmodel(&tmp)
        .arg("check")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 1 project(s)"));
}

#[test]
fn test_check_lists_errors() {
    let (tmp, log) = write_log(&broken_log());

    logmodel(&tmp)
        .arg("check")
        .arg(&log)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[lookup]: project 42 was never started"))
        .stdout(predicate::str::contains("help: consider:"))
        .stdout(predicate::str::contains(
            "1 error(s) while building the log model",
        ));
}

#[test]
fn test_check_events_after_build_finished() {
    let contents = format!("{}{}", GOOD_LOG, ORPHAN_MESSAGE);
    let (tmp, log) = write_log(&contents);

    logmodel(&tmp)
        .arg("check")
        .arg(&log)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "message received after the build finished",
        ))
        .stdout(predicate::str::contains("note: 1 event(s) arrived after the build finished"));
}

// ============================================================================
// logmodel summary
// ============================================================================

#[test]
fn test_summary() {
    let (tmp, log) = write_log(GOOD_LOG);

    logmodel(&tmp)
        .arg("summary")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Result:      succeeded"))
        .stdout(predicate::str::contains("Duration:    8.00s"))
        .stdout(predicate::str::contains("Warnings:    1"));
}

#[test]
fn test_summary_json() {
    let (tmp, log) = write_log(GOOD_LOG);

    let output = logmodel(&tmp)
        .args(["summary", "--json"])
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["projects"], 1);
    assert_eq!(json["tasks"], 1);
    assert_eq!(json["warnings"], 1);
    assert_eq!(json["duration_ms"], 8000);
}

// ============================================================================
// logmodel completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    logmodel(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logmodel"));
}
