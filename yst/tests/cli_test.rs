//! Integration tests for the yst binary

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo_bin;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const BUNDLE: &str = r#"{
  "templates": {
    "list": [
      "<ul>",
      { "op": "apply", "set": "values", "template": ["<li>$e.name$</li>"] },
      "</ul>"
    ],
    "hello": ["Hello $params.who$ from $site$"],
    "raw": ["$e$"],
    "broken": [{ "op": "apply", "set": "missing", "template": ["x"] }]
  }
}"#;

/// Write the bundle and a data file into a fresh temp dir
fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bundle = dir.path().join("bundle.json");
    let data = dir.path().join("data.json");
    fs::write(&bundle, BUNDLE).expect("Failed to write bundle");
    fs::write(
        &data,
        r#"{ "values": [{ "name": "Pen" }, { "name": "<Lamp>" }], "site": "shop" }"#,
    )
    .expect("Failed to write data");
    (dir, bundle, data)
}

fn yst(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("yst"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_cli_help_flag() {
    let (dir, _, _) = setup();
    yst(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn test_render_with_data_file() {
    let (dir, bundle, data) = setup();
    yst(dir.path())
        .arg("render")
        .arg(&bundle)
        .arg("list")
        .arg("--data")
        .arg(&data)
        .assert()
        .success()
        .stdout("<ul><li>Pen</li><li>&lt;Lamp></li></ul>\n");
}

#[test]
fn test_render_with_params_and_globals() {
    let (dir, bundle, data) = setup();
    yst(dir.path())
        .args(["render"])
        .arg(&bundle)
        .arg("hello")
        .arg("--data")
        .arg(&data)
        .args(["--params", r#"{"who": "Ann"}"#])
        .assert()
        .success()
        .stdout("Hello Ann from shop\n");
}

#[test]
fn test_render_literal_mode() {
    let (dir, bundle, _) = setup();
    let data = dir.path().join("array.json");
    fs::write(&data, r#"["<b>bold</b>"]"#).expect("Failed to write data");

    yst(dir.path())
        .arg("render")
        .arg(&bundle)
        .arg("raw")
        .arg("--data")
        .arg(&data)
        .arg("--literal")
        .assert()
        .success()
        .stdout("<b>bold</b>\n");
}

#[test]
fn test_render_error_panel_by_default() {
    let (dir, bundle, _) = setup();
    yst(dir.path())
        .arg("render")
        .arg(&bundle)
        .arg("broken")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error processing set attribute."));
}

#[test]
fn test_render_strict_fails() {
    let (dir, bundle, _) = setup();
    yst(dir.path())
        .arg("render")
        .arg(&bundle)
        .arg("broken")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Undefined expression: missing in set attribute"));
}

#[test]
fn test_render_unknown_template() {
    let (dir, bundle, _) = setup();
    yst(dir.path())
        .arg("render")
        .arg(&bundle)
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found: nope"));
}

#[test]
fn test_print_single_template() {
    let (dir, bundle, _) = setup();
    yst(dir.path())
        .arg("print")
        .arg(&bundle)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("YST.Txt.apply"))
        .stdout(predicate::str::contains("'<li>$e.name$</li>'"))
        .stdout(predicate::str::contains("hello").not());
}

#[test]
fn test_check_clean_bundle() {
    let (dir, bundle, _) = setup();
    yst(dir.path())
        .arg("check")
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 templates OK"));
}

#[test]
fn test_check_reports_problems() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bundle = dir.path().join("bad.json");
    fs::write(
        &bundle,
        r#"{ "templates": { "main": ["$e +$", { "op": "include", "target": "ghost" }] } }"#,
    )
    .expect("Failed to write bundle");

    yst(dir.path())
        .arg("check")
        .arg(&bundle)
        .assert()
        .failure()
        .stdout(predicate::str::contains("main: marker 'e +'"))
        .stdout(predicate::str::contains("main: include 'ghost': Template not found"))
        .stderr(predicate::str::contains("2 problem(s) found"));
}

#[test]
fn test_config_file_enables_strict_mode() {
    let (dir, bundle, _) = setup();
    let config = dir.path().join("yst.yml");
    fs::write(&config, "alert-errors: false\n").expect("Failed to write config");

    yst(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg(&bundle)
        .arg("broken")
        .assert()
        .failure();
}
