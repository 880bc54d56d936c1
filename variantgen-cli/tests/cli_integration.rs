//! Integration tests for the vgen binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const MODEL: &str = r#"
types:
  - name: String
    kind: scalar
  - name: Int32
    kind: scalar
  - name: Thing
    kind: object
    properties:
      - name: Name
        type: String
        required: true
        description: Display name
      - name: Parts
        type: Thing[]
commands:
  - name: Get-Thing
    variants:
      - name: A
        module: Things.Private
        command: Get-Thing_A
        parameters:
          - name: Name
            type: String
            mandatory: true
          - name: Id
            type: String
      - name: B
        module: Things.Private
        command: Get-Thing_B
        parameters:
          - name: Name
            type: String
            mandatory: true
          - name: Tag
            type: String
            mandatory: true
            pipeline: true
  - name: Set-Value
    variants:
      - name: C
        module: Things.Private
        command: Set-Value_C
        description: Sets a value
        parameters:
          - name: Value
            type: Int32
            mandatory: true
            position: 0
          - name: Body
            type: Thing
"#;

const BROKEN_MODEL: &str = r#"
types:
  - name: String
    kind: scalar
commands:
  - name: Get-Fine
    variants:
      - name: Only
        module: M
        command: Get-Fine_Only
  - name: Get-Broken
    variants:
      - name: A
        module: M
        command: Get-Broken_A
        parameters:
          - name: X
            type: String
      - name: B
        module: M
        command: Get-Broken_B
        parameters:
          - name: X
            type: String
      - name: C
        module: M
        command: Get-Broken_C
"#;

/// A temp directory holding `model.yaml`; the directory doubles as the working
/// directory so no project configuration leaks in
fn workspace(model: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("model.yaml");
    fs::write(&path, model).unwrap();
    (temp, path)
}

fn vgen(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vgen").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("vgen")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("docs"));
}

#[test]
fn test_generate_text() {
    let (temp, model) = workspace(MODEL);
    vgen(&temp)
        .arg("generate")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("function Get-Thing {"))
        .stdout(predicate::str::contains("function Set-Value {"))
        .stdout(predicate::str::contains("A = 'Things.Private\\Get-Thing_A'"))
        .stdout(predicate::str::contains("DefaultParameterSetName='__AllParameterSets'"));
}

#[test]
fn test_generate_json_report() {
    let (temp, model) = workspace(MODEL);
    let output = vgen(&temp)
        .args(["generate", "--format", "json"])
        .arg(&model)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let surfaces = report["surfaces"].as_array().unwrap();
    assert_eq!(surfaces.len(), 2);
    assert_eq!(surfaces[0]["command"], "Get-Thing");
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);
    // Get-Thing has no default variant
    assert_eq!(report["warnings"][0]["command"], "Get-Thing");
}

#[test]
fn test_generate_into_directory() {
    let (temp, model) = workspace(MODEL);
    let out_dir = temp.path().join("out");
    vgen(&temp)
        .args(["generate", "--format", "yaml", "--output"])
        .arg(&out_dir)
        .arg(&model)
        .assert()
        .success();

    let get_thing = fs::read_to_string(out_dir.join("Get-Thing.yaml")).unwrap();
    assert!(get_thing.contains("command: Get-Thing"));
    assert!(out_dir.join("Set-Value.yaml").is_file());
}

#[test]
fn test_generate_reports_failed_groups_with_exit_code_2() {
    let (temp, model) = workspace(BROKEN_MODEL);
    vgen(&temp)
        .arg("generate")
        .arg(&model)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("function Get-Fine {"))
        .stdout(predicate::str::contains("Get-Broken").not())
        .stderr(predicate::str::contains("error: Get-Broken"));
}

#[test]
fn test_check_summarizes_each_command() {
    let (temp, model) = workspace(MODEL);
    vgen(&temp)
        .arg("check")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok      Get-Thing (2 variants, default: none)"))
        .stdout(predicate::str::contains("ok      Set-Value (1 variants, default: __AllParameterSets)"))
        .stdout(predicate::str::contains("2 commands checked, 0 failed, 1 warnings"));
}

#[test]
fn test_check_fails_on_ambiguous_membership() {
    let (temp, model) = workspace(BROKEN_MODEL);
    vgen(&temp)
        .arg("check")
        .arg(&model)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("error   Get-Broken"))
        .stdout(predicate::str::contains("2 commands checked, 1 failed"));
}

#[test]
fn test_docs_for_one_command() {
    let (temp, model) = workspace(MODEL);
    vgen(&temp)
        .args(["docs"])
        .arg(&model)
        .arg("Set-Value")
        .assert()
        .success()
        .stdout(predicate::str::contains("Set-Value [-Value] <Int32> [-Body <Thing>]"))
        .stdout(predicate::str::contains("# .Description"))
        .stdout(predicate::str::contains("Sets a value"))
        .stdout(predicate::str::contains("COMPLEX PARAMETER PROPERTIES"))
        .stdout(predicate::str::contains("-Value <Int32>"));
}

#[test]
fn test_docs_unknown_command_is_an_error() {
    let (temp, model) = workspace(MODEL);
    vgen(&temp)
        .arg("docs")
        .arg(&model)
        .arg("Remove-Thing")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Remove-Thing"));
}

#[test]
fn test_missing_model_is_an_error() {
    let temp = TempDir::new().unwrap();
    vgen(&temp)
        .args(["check", "does-not-exist.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load model"));
}

#[test]
fn test_project_config_and_flags_change_indentation() {
    let (temp, model) = workspace(MODEL);
    let config_dir = temp.path().join(".variantgen");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("variantgen.toml"), "half_indent = 4\n").unwrap();

    vgen(&temp)
        .arg("generate")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n        param {"));

    vgen(&temp)
        .args(["generate", "--half-indent", "1"])
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  param {"));
}

#[test]
fn test_invalid_config_is_an_error() {
    let (temp, model) = workspace(MODEL);
    vgen(&temp)
        .args(["generate", "--half-indent", "0"])
        .arg(&model)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("half_indent"));
}

#[test]
fn test_generate_into_directory_skips_names_that_are_not_file_names() {
    let model = r#"
commands:
  - name: ../Escape
    variants:
      - name: Only
        module: M
        command: Escape_Only
  - name: Get-Fine
    variants:
      - name: Only
        module: M
        command: Get-Fine_Only
"#;
    let (temp, model) = workspace(model);
    let out_dir = temp.path().join("out");
    vgen(&temp)
        .arg("generate")
        .arg("--output")
        .arg(&out_dir)
        .arg(&model)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: ../Escape"));

    assert!(out_dir.join("Get-Fine.txt").is_file());
    assert!(!temp.path().join("Escape.txt").exists());
}
