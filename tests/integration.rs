use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docslayer")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read_json(path: &std::path::Path) -> Value {
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

// -- stdout mode --

#[test]
fn markdown_to_stdout() {
    cmd()
        .arg(fixture_path("swc_door.c"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Documentation: swc_door.c\n"))
        .stdout(predicate::str::contains("* [SwcDoor_Run](#swcdoor_run)"))
        .stdout(predicate::str::contains("| Function Type | Runnable |"))
        .stdout(predicate::str::contains("| Triggers | TimingEvent 10ms |"))
        .stdout(predicate::str::contains(
            "| Outputs | Rte_Write_DoorState_Value |",
        ))
        .stdout(predicate::str::contains("| Out-Parameters | state |"))
        .stdout(predicate::str::contains("# Macros"))
        .stdout(predicate::str::contains("## DOOR_CLAMP"))
        .stdout(predicate::str::contains("# Variables"))
        .stdout(predicate::str::contains("| Scope | Static Global |"));
}

#[test]
fn no_gui_flag_accepted() {
    cmd()
        .args(["--no-gui", &fixture_path("swc_door.c")])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Door_Clamp"));
}

#[test]
fn parse_targets_limit_output() {
    let assert = cmd()
        .args(["-p", "variables", "-f", "json", &fixture_path("swc_door.c")])
        .assert()
        .success();
    let v: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["functions"], Value::Array(Vec::new()));
    assert_eq!(v["macros"], Value::Array(Vec::new()));

    let names: Vec<&str> = v["variables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|var| var["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["g_doorErrors", "s_ctx", "s_history", "g_doorCycles"]);
    assert_eq!(v["variables"][0]["scope"], "Extern");
    assert_eq!(v["variables"][2]["dataType"], "uint8[4]");
    assert_eq!(v["variables"][2]["initialValue"], "{0, 0, 0, 0}");
    assert_eq!(v["variables"][3]["scope"], "Global");
}

// -- file output --

#[test]
fn json_file_output() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-f", "json", "-o"])
        .arg(dir.path())
        .arg(fixture_path("swc_door.c"))
        .assert()
        .success();

    let v = read_json(&dir.path().join("swc_door.json"));
    let functions = v["functions"].as_array().unwrap();
    assert_eq!(functions.len(), 3);

    let run = &functions[0];
    assert_eq!(run["name"], "SwcDoor_Run");
    assert_eq!(run["category"], "Runnable");
    assert_eq!(run["lineNumber"], 26);
    assert_eq!(run["trigger"], "TimingEvent 10ms");
    assert_eq!(
        run["description"],
        "Update the door state machine. Reads the lock request and publishes the new state."
    );
    assert_eq!(run["inputs"][0], "Rte_Read_LockRequest_Value");
    let invoked: Vec<&str> = run["invokedOperations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(invoked, ["Door_Apply", "Rte_Call_Nvm_WriteBlock"]);

    let apply = &functions[1];
    assert_eq!(apply["name"], "Door_Apply");
    assert_eq!(apply["category"], "Static");
    assert_eq!(apply["inParams"], serde_json::json!(["req"]));
    assert_eq!(apply["outParams"], serde_json::json!(["state"]));
    assert_eq!(apply["description"], "Copy the current state into a caller buffer.");

    let clamp = &functions[2];
    assert_eq!(clamp["name"], "Door_Clamp");
    assert_eq!(clamp["category"], "Global");
    assert_eq!(clamp["returnType"], "uint8");
    assert_eq!(clamp["parameters"][0]["direction"], "IN");
    assert_eq!(clamp["parameters"][1]["direction"], "OUT");
    assert_eq!(clamp["parameters"][2]["direction"], "INOUT");
    assert_eq!(clamp["trigger"], "");

    assert_eq!(v["macros"][0]["name"], "DOOR_TIMEOUT_MS");
    assert_eq!(v["macros"][0]["value"], "(500u)");
    assert_eq!(v["macros"][1]["parameters"], "(v, lo, hi)");
}

#[test]
fn several_formats_per_file() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-f", "md,json", "-o"])
        .arg(dir.path())
        .arg(fixture_path("swc_door.c"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dir.path().join("swc_door.md").exists());
    assert!(dir.path().join("swc_door.json").exists());
}

#[test]
fn unavailable_format_fails_but_others_are_written() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-f", "excel,markdown", "-o"])
        .arg(dir.path())
        .arg(fixture_path("swc_door.c"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("excel export"));

    let md = fs::read_to_string(dir.path().join("swc_door.md")).unwrap();
    assert!(md.contains("## SwcDoor_Run"));
}

// -- directories and patterns --

#[test]
fn directory_inputs_respect_recursion_and_pattern() {
    let src = TempDir::new().unwrap();
    fs::create_dir(src.path().join("sub")).unwrap();
    fs::write(src.path().join("top.c"), "uint8 g_top;\n").unwrap();
    fs::write(src.path().join("top_cfg.h"), "#define TOP_CFG 1\n").unwrap();
    fs::write(src.path().join("sub/inner.c"), "uint8 g_inner;\n").unwrap();

    let flat = TempDir::new().unwrap();
    cmd()
        .arg("-o")
        .arg(flat.path())
        .arg(src.path())
        .assert()
        .success();
    assert!(flat.path().join("top.md").exists());
    assert!(!flat.path().join("inner.md").exists());
    assert!(!flat.path().join("top_cfg.md").exists());

    let deep = TempDir::new().unwrap();
    cmd()
        .arg("-r")
        .arg("-o")
        .arg(deep.path())
        .arg(src.path())
        .assert()
        .success();
    assert!(deep.path().join("top.md").exists());
    assert!(deep.path().join("inner.md").exists());

    let headers = TempDir::new().unwrap();
    cmd()
        .args(["--file-pattern", "*.h", "-f", "json", "-o"])
        .arg(headers.path())
        .arg(src.path())
        .assert()
        .success();
    let v = read_json(&headers.path().join("top_cfg.json"));
    assert_eq!(v["macros"][0]["name"], "TOP_CFG");
    assert!(!headers.path().join("top.json").exists());
}

#[test]
fn empty_directory_is_an_error() {
    let src = TempDir::new().unwrap();
    cmd()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files matching *.c found"));
}

// -- config file --

#[test]
fn config_file_drives_the_batch() {
    let out = TempDir::new().unwrap();
    let mut config = NamedTempFile::new().unwrap();
    let body = serde_json::json!({
        "inputs": [fixture_path("swc_door.c")],
        "output": out.path(),
        "format": ["markdown"],
        "parse": "functions",
        "function_fields": ["Name", "Syntax", "Triggers"],
    });
    write!(config, "{}", body).unwrap();

    cmd()
        .arg("--config")
        .arg(config.path())
        .assert()
        .success();

    let md = fs::read_to_string(out.path().join("swc_door.md")).unwrap();
    assert!(md.contains("| Syntax | `uint8 Door_Clamp(const uint8 *value, uint8 *out, uint8 *count)` |"));
    assert!(md.contains("| Triggers | TimingEvent 10ms |"));
    assert!(!md.contains("| Description |"));
    assert!(!md.contains("# Macros"));
}

#[test]
fn command_line_overrides_config() {
    let out = TempDir::new().unwrap();
    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        r#"{{"inputs": ["{}"], "format": "markdown"}}"#,
        fixture_path("swc_door.c")
    )
    .unwrap();

    cmd()
        .arg("--config")
        .arg(config.path())
        .args(["-f", "json", "-o"])
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("swc_door.json").exists());
    assert!(!out.path().join("swc_door.md").exists());
}

#[test]
fn unknown_config_key_rejected() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, r#"{{"inputz": []}}"#).unwrap();

    cmd()
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

// -- errors --

#[test]
fn missing_input_fails() {
    cmd()
        .arg("/nonexistent/door.c")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("input not found"));
}

#[test]
fn missing_input_does_not_stop_the_batch() {
    let out = TempDir::new().unwrap();
    let missing = out.path().join("missing.c");
    cmd()
        .arg("-o")
        .arg(out.path())
        .arg(fixture_path("swc_door.c"))
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("input not found"));

    let md = fs::read_to_string(out.path().join("swc_door.md")).unwrap();
    assert!(md.contains("## SwcDoor_Run"));
}

#[test]
fn unreadable_file_does_not_stop_the_batch() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("bad.c"), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(src.path().join("good.c"), "uint8 g_ok;\n").unwrap();
    let out = TempDir::new().unwrap();

    cmd()
        .arg("-o")
        .arg(out.path())
        .arg(src.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("bad.c"));

    assert!(out.path().join("good.md").exists());
    assert!(!out.path().join("bad.md").exists());
}

#[test]
fn closed_stdout_ends_the_batch_quietly() {
    let src = TempDir::new().unwrap();
    for i in 0..200 {
        fs::copy(fixture_path("swc_door.c"), src.path().join(format!("door_{i}.c"))).unwrap();
    }

    let mut child = Command::new(env!("CARGO_BIN_EXE_docslayer"))
        .arg(src.path())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("export"), "{stderr}");
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "pdf", &fixture_path("swc_door.c")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn no_inputs_fails() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no inputs given"));
}
