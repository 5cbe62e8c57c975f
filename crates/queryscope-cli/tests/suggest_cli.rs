use std::process::Command;

use tempfile::tempdir;

const SCHEMA_JSON: &str = r#"{
  "title": "test-index",
  "fields": [
    { "name": "field1", "type": "string" },
    { "name": "field2", "type": "number" }
  ]
}"#;

fn write_schema(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("schema.json");
    std::fs::write(&path, SCHEMA_JSON).expect("write schema");
    path
}

#[test]
fn test_suggest_from_clause_table() {
    let dir = tempdir().expect("temp dir");
    let schema_path = write_schema(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_queryscope"))
        .args([
            "SELECT * FROM ",
            "--schema",
            schema_path.to_str().expect("schema path"),
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(
        stdout.contains("test-index"),
        "Expected index pattern suggestion: {stdout}"
    );
}

#[test]
fn test_suggest_json_output_parses() {
    let dir = tempdir().expect("temp dir");
    let schema_path = write_schema(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_queryscope"))
        .args([
            "SELECT * FROM test-index WHERE ",
            "--schema",
            schema_path.to_str().expect("schema path"),
            "--format",
            "json",
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    let suggestions = parsed.as_array().expect("array");
    assert!(suggestions
        .iter()
        .any(|s| s["text"] == "field1" && s["kind"] == "field"));
}

#[test]
fn test_suggest_ppl_values_from_static_fetcher() {
    let dir = tempdir().expect("temp dir");
    let schema_path = write_schema(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_queryscope"))
        .args([
            "source = test-index | where field1 = ",
            "--language",
            "ppl",
            "--schema",
            schema_path.to_str().expect("schema path"),
            "--values",
            "field1=alpha,beta",
            "--format",
            "json",
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    let suggestions = parsed.as_array().expect("array");
    assert!(suggestions
        .iter()
        .any(|s| s["text"] == "alpha" && s["kind"] == "value"));
}

#[test]
fn test_suggest_without_schema_prints_no_suggestions() {
    let output = Command::new(env!("CARGO_BIN_EXE_queryscope"))
        .args(["SELECT * FROM "])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(
        stdout.contains("no suggestions"),
        "Expected empty result without schema: {stdout}"
    );
}

#[test]
fn test_missing_schema_file_is_config_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_queryscope"))
        .args(["SELECT 1", "--schema", "/nonexistent/schema.json"])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("queryscope: error"), "stderr: {stderr}");
}
