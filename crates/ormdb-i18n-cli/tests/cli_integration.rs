//! End-to-end tests running the `ormdb-i18n` binary.

use std::path::Path;
use std::process::{Command, Output};

const SCHEMA: &str = r#"{
    "i18n": { "languages": ["FR", "EN", "ES"], "default_language": "FR" },
    "models": [
        {
            "name": "model",
            "fields": [
                { "name": "id", "type": "int64", "auto_increment": true },
                { "name": "name", "type": "string", "translatable": true },
                { "name": "reference", "type": "string" }
            ]
        }
    ]
}"#;

fn cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ormdb-i18n"))
        .arg("--data-path")
        .arg(dir.join("data"))
        .arg("--schema")
        .arg(dir.join("schema.json"))
        .arg("--format")
        .arg("json")
        .args(args)
        .output()
        .unwrap()
}

fn json(output: Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
    dir
}

#[test]
fn test_records_persist_between_runs() {
    let dir = workspace();
    let path = dir.path();

    let created = json(cli(
        path,
        &["create", "model", "--set", "name=test", "--set", "reference=xxx"],
    ));
    assert_eq!(created["id"], 1);
    assert_eq!(created["associations"]["model_i18n"].as_array().unwrap().len(), 3);

    json(cli(
        path,
        &["update", "model", "1", "--set", "name=test-en-update", "--lang", "EN"],
    ));

    let english = json(cli(path, &["get", "model", "1", "--lang", "EN"]));
    assert_eq!(english["values"]["name"], "test-en-update");

    let french = json(cli(path, &["get", "model", "1"]));
    assert_eq!(french["values"]["name"], "test");

    let listed = json(cli(path, &["list", "model", "--lang", "ES"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["values"]["name"], "test");

    let deleted = json(cli(path, &["delete", "model", "1"]));
    assert_eq!(deleted["message"], "deleted model 1");

    let missing = cli(path, &["get", "model", "1"]);
    assert!(!missing.status.success());
}

#[test]
fn test_tables() {
    let dir = workspace();
    let tables = json(cli(dir.path(), &["tables"]));

    assert_eq!(tables[0]["name"], "model");
    assert_eq!(tables[1]["name"], "model_i18n");
    assert_eq!(tables[1]["translates"], "model");
}

#[test]
fn test_unknown_language_fails() {
    let dir = workspace();
    json(cli(dir.path(), &["create", "model", "--set", "name=a", "--set", "reference=r"]));

    let output = cli(dir.path(), &["get", "model", "1", "--lang", "DE"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown language: DE"));
}

#[test]
fn test_non_numeric_id_fails() {
    let dir = workspace();
    let output = cli(dir.path(), &["get", "model", "abc"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid model id 'abc'"));
}
