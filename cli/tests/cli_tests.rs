//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("i18n-neutral").expect("binary should exist")
}

fn simple_schema() -> String {
    serde_json::json!({
        "name": { "type": "String", "i18n": true },
        "age": { "type": "Number" }
    })
    .to_string()
}

// ── Apply to Stdout ─────────────────────────────────────────────────────────

#[test]
fn test_apply_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    let output = cmd()
        .args(["apply", input.to_str().unwrap(), "--languages", "es,fr,en"])
        .args(["--format", "compact"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let definition: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout should be valid JSON");
    assert_eq!(definition["name"]["_def"]["required"], serde_json::json!(true));
    assert_eq!(definition["name"]["en"]["required"], serde_json::json!(false));
    assert_eq!(definition["age"], serde_json::json!({ "type": "Number" }));
}

// ── Apply to File with Virtuals Manifest ────────────────────────────────────

#[test]
fn test_apply_to_file_with_virtuals() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let output = dir.path().join("out.json");
    let virtuals = dir.path().join("virtuals.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap(), "-l", "es,en"])
        .args(["-o", output.to_str().unwrap()])
        .args(["--virtuals", virtuals.to_str().unwrap()])
        .assert()
        .success();

    let out_content = fs::read_to_string(&output).expect("output file should exist");
    let definition: serde_json::Value =
        serde_json::from_str(&out_content).expect("output should be valid JSON");
    assert!(definition["name"].get("es").is_some());

    let manifest_content = fs::read_to_string(&virtuals).expect("manifest should exist");
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_content).expect("manifest should be valid JSON");
    assert_eq!(manifest["languages"], serde_json::json!(["es", "en"]));
    assert_eq!(manifest["useDefault"], serde_json::json!(true));
    assert_eq!(manifest["virtuals"].as_array().map(Vec::len), Some(2));
}

// ── Config File and --no-default ────────────────────────────────────────────

#[test]
fn test_apply_with_config_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let config = dir.path().join("plugin.json");
    fs::write(&input, simple_schema()).unwrap();
    fs::write(&config, r#"{"languages": ["de"], "useDefault": false}"#).unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"de\""))
        .stdout(predicate::str::contains("_def").not());
}

#[test]
fn test_apply_no_default_flag() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap(), "-l", "es", "--no-default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_def").not());
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let config = dir.path().join("plugin.json");
    fs::write(&input, simple_schema()).unwrap();
    fs::write(&config, r#"{"languages": ["es"], "useDefault": "no"}"#).unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("useDefault option value must be boolean"));
}

// ── Rewrite Errors ──────────────────────────────────────────────────────────

#[test]
fn test_non_string_i18n_field() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(
        &input,
        serde_json::json!({ "age": { "type": "Number", "i18n": true } }).to_string(),
    )
    .unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap(), "-l", "es"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("applies only to Strings"));
}

#[test]
fn test_languages_required() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["apply", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--languages"));
}

// ── Validate ────────────────────────────────────────────────────────────────

#[test]
fn test_validate_reports_missing_default() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let document = dir.path().join("doc.json");
    fs::write(&input, simple_schema()).unwrap();
    fs::write(&document, r#"{"name": {"es": "hola"}, "age": 3}"#).unwrap();

    cmd()
        .args(["validate", input.to_str().unwrap(), document.to_str().unwrap()])
        .args(["-l", "es,en"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("name._def"))
        .stderr(predicate::str::contains("Path `name._def` is required."));
}

#[test]
fn test_validate_success() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let document = dir.path().join("doc.json");
    fs::write(&input, simple_schema()).unwrap();
    fs::write(&document, r#"{"name": {"_def": "hello", "es": "hola"}}"#).unwrap();

    cmd()
        .args(["validate", input.to_str().unwrap(), document.to_str().unwrap()])
        .args(["-l", "es,en", "--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

// ── Invalid Input ───────────────────────────────────────────────────────────

#[test]
fn test_invalid_input() {
    cmd()
        .args(["apply", "/nonexistent/path/schema.json", "-l", "es"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open schema file"));
}

// ── Help Output ─────────────────────────────────────────────────────────────

#[test]
fn test_help_output() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_apply_help() {
    cmd()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--languages"))
        .stdout(predicate::str::contains("--virtuals"))
        .stdout(predicate::str::contains("--no-default"));
}
