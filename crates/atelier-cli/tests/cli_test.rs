//! End-to-end tests for the `atelier` binary.
//!
//! Every command here runs offline: synthesis uses the `test_mode` pantry
//! or a missing credential, and config lives in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn atelier(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_atelier"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("GEMINI_API_KEY")
        .env_remove("ATELIER_GEMINI_MODEL")
        .env_remove("ATELIER_GEMINI_BASE_URL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run atelier binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Synthesize the offline plan into `dir/plan.json`.
fn synthesize_into(dir: &Path) -> std::path::PathBuf {
    let plan = dir.join("plan.json");
    let out = atelier(
        dir,
        &[
            "synthesize",
            "--pantry",
            "spinach, TEST_MODE",
            "--output",
            plan.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "synthesize failed: {}", stderr(&out));
    plan
}

#[test]
fn schema_prints_required_top_level_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = atelier(tmp.path(), &["schema"]);
    assert!(out.status.success());

    let schema: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(schema["type"], "OBJECT");
    assert_eq!(
        schema["required"],
        serde_json::json!(["id", "summary", "days", "groceryList", "analytics"])
    );
}

#[test]
fn synthesize_test_mode_writes_deterministic_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    let plan_path = synthesize_into(tmp.path());

    let plan: Value = serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
    assert_eq!(plan["id"], "atelier-eval-deterministic");
    assert_eq!(plan["days"].as_array().unwrap().len(), 7);
}

#[test]
fn synthesize_without_credential_falls_back_offline() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = atelier(
        tmp.path(),
        &["synthesize", "--pantry", "rice, dal", "--persona", "student"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).starts_with("Plan atelier-eval-deterministic"));
    assert!(stderr(&out).contains("Campus Kitchen"));
    assert!(
        stderr(&out).contains("falling back to mock plan"),
        "missing fallback warning: {}",
        stderr(&out)
    );
}

#[test]
fn synthesize_rejects_blank_pantry() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = atelier(tmp.path(), &["synthesize", "--pantry", "   "]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("pantry is empty"));
}

#[test]
fn show_day_and_grocery() {
    let tmp = tempfile::TempDir::new().unwrap();
    let plan_path = synthesize_into(tmp.path());
    let plan = plan_path.to_str().unwrap();

    let day = atelier(tmp.path(), &["show", plan, "--day", "3"]);
    assert!(day.status.success());
    assert!(stdout(&day).starts_with("Day 3 "));

    let grocery = atelier(tmp.path(), &["show", plan, "--grocery"]);
    assert!(grocery.status.success());
    assert!(stdout(&grocery).contains("Total  INR"));

    let missing = atelier(tmp.path(), &["show", plan, "--day", "8"]);
    assert!(!missing.status.success());
}

#[test]
fn export_writes_ics() {
    let tmp = tempfile::TempDir::new().unwrap();
    let plan_path = synthesize_into(tmp.path());
    let ics_path = tmp.path().join("week.ics");

    let out = atelier(
        tmp.path(),
        &[
            "export",
            plan_path.to_str().unwrap(),
            "--output",
            ics_path.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Exported 14 events"));

    let ics = std::fs::read_to_string(&ics_path).unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
    assert!(ics.ends_with("END:VCALENDAR"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    let first = atelier(tmp.path(), &["init", "--api-key", "AIzaSyA-1234567890-abcd"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert!(stdout(&first).contains("AIza...abcd"));
    assert!(!stdout(&first).contains("1234567890"));

    let second = atelier(tmp.path(), &["init"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("--force"));

    let forced = atelier(tmp.path(), &["init", "--force"]);
    assert!(forced.status.success());
}
