//! Integration tests for the `yarnturn` command-line driver.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const START: &str = r#"{"type":"init","gen":0,"metrics":{"width":80,"height":24}}"#;

/// Create a temp directory holding a small compiled game.
fn test_game() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("game.json"),
        r#"{
    "strings": {
        "hall": "You stand in a cold hall.",
        "draft": "A draft blows from the {0}.",
        "north": "Go north",
        "wait": "Wait",
        "garden": "The garden is quiet. The end."
    },
    "initial_values": { "$direction": "north" },
    "nodes": {
        "Start": [
            { "op": "line", "id": "hall" },
            { "op": "line", "id": "draft", "subs": ["$direction"] },
            { "op": "option", "id": "north", "dest": "Garden" },
            { "op": "option", "id": "wait" },
            { "op": "show_options" },
            { "op": "jump", "node": "Start" }
        ],
        "Garden": [
            { "op": "line", "id": "garden" },
            { "op": "stop" }
        ]
    }
}
"#,
    )
    .unwrap();
    dir
}

fn yarnturn(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("yarnturn").unwrap();
    cmd.current_dir(dir).arg("game.json");
    cmd
}

fn hyperlink(value: &str) -> String {
    format!(r#"{{"type":"hyperlink","gen":1,"window":1,"value":"{value}"}}"#)
}

fn update(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).unwrap();
    assert_eq!(text.lines().count(), 1, "update must be one line: {text}");
    serde_json::from_str(text).unwrap()
}

/// The window's lines as `"<style>: <text>"`.
fn texts(update: &Value) -> Vec<String> {
    update["content"][0]["text"]
        .as_array()
        .map(|lines| {
            lines
                .iter()
                .map(|l| {
                    let run = &l["content"][0];
                    format!(
                        "{}: {}",
                        run["style"].as_str().unwrap(),
                        run["text"].as_str().unwrap()
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

#[test]
fn start_renders_opening_turn() {
    let dir = test_game();
    let out = yarnturn(dir.path())
        .write_stdin(format!("{START}\n"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc = update(&out);
    assert_eq!(doc["type"], "update");
    assert_eq!(doc["gen"], 1);
    assert_eq!(doc["windows"][0]["type"], "buffer");
    assert_eq!(doc["windows"][0]["width"].as_f64(), Some(80.0));
    assert_eq!(
        texts(&doc),
        [
            "normal: You stand in a cold hall.",
            "normal: A draft blows from the north.",
            "note: Go north",
            "note: Wait",
        ]
    );
    assert_eq!(doc["content"][0]["text"][2]["content"][0]["hyperlink"], "1:0");
    assert_eq!(doc["input"][0]["gen"], 1);
    assert!(doc.get("exit").is_none());

    let save = fs::read_to_string(dir.path().join("autosave.json")).unwrap();
    assert!(save.starts_with("{\n  \"Turn\": 1,\n  \"Gen\": 1,"));
    assert!(save.ends_with("}\n"));
}

#[test]
fn start_flag_ignores_stanza() {
    let dir = test_game();
    let out = yarnturn(dir.path())
        .arg("--start")
        .write_stdin("{\"type\":\"refresh\"}\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc = update(&out);
    assert_eq!(doc["windows"][0]["height"].as_f64(), Some(24.0));
    assert_eq!(texts(&doc).len(), 4);
}

#[test]
fn unknown_start_node_fails() {
    let dir = test_game();
    yarnturn(dir.path())
        .args(["--start-node", "Epilogue"])
        .write_stdin(format!("{START}\n"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: ").and(predicate::str::contains("Epilogue")));
    assert!(!dir.path().join("autosave.json").exists());
}

// ---------------------------------------------------------------------------
// resume
// ---------------------------------------------------------------------------

#[test]
fn choice_advances_story() {
    let dir = test_game();
    yarnturn(dir.path()).write_stdin(START).assert().success();

    let out = yarnturn(dir.path())
        .write_stdin(hyperlink("1:1"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc = update(&out);

    assert_eq!(doc["gen"], 2);
    assert!(doc.get("windows").is_none());
    let lines = texts(&doc);
    assert_eq!(lines[0], "input: Wait");
    assert_eq!(lines[1], "normal: You stand in a cold hall.");
    assert_eq!(doc["content"][0]["text"][3]["content"][0]["hyperlink"], "2:0");

    let out = yarnturn(dir.path())
        .write_stdin(hyperlink("2:0"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc = update(&out);
    assert_eq!(
        texts(&doc),
        [
            "input: Go north",
            "normal: The garden is quiet. The end.",
        ]
    );
    assert_eq!(doc["exit"], true);
    assert!(doc.get("input").is_none());
}

#[test]
fn stale_choice_is_idle() {
    let dir = test_game();
    yarnturn(dir.path()).write_stdin(START).assert().success();

    let out = yarnturn(dir.path())
        .write_stdin(hyperlink("7:0"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(update(&out), serde_json::json!({"type": "update", "gen": 2}));

    // The options offered on turn 1 are still good.
    yarnturn(dir.path())
        .write_stdin(hyperlink("1:0"))
        .assert()
        .success()
        .stdout(predicate::str::contains("The garden is quiet."));
}

#[test]
fn resume_without_autosave_fails() {
    let dir = test_game();
    yarnturn(dir.path())
        .write_stdin(hyperlink("1:0"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no saved session"));
}

#[test]
fn corrupt_autosave_fails_and_is_kept() {
    let dir = test_game();
    let save = dir.path().join("autosave.json");
    fs::write(&save, "{\"Turn\": 1, \"Gen\": ").unwrap();

    yarnturn(dir.path())
        .write_stdin(hyperlink("1:0"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed autosave"));
    assert_eq!(fs::read_to_string(&save).unwrap(), "{\"Turn\": 1, \"Gen\": ");
}

#[test]
fn autodir_and_compact_autosave() {
    let dir = test_game();
    yarnturn(dir.path())
        .args(["--autodir", "saves/slot1", "--compact-autosave"])
        .write_stdin(START)
        .assert()
        .success();

    let save = fs::read_to_string(dir.path().join("saves/slot1/autosave.json")).unwrap();
    assert!(save.starts_with("{\"Turn\":1,\"Gen\":1,\"MetricsWidth\":80"));
    assert_eq!(save.lines().count(), 1);
    assert!(!dir.path().join("autosave.json").exists());
}

// ---------------------------------------------------------------------------
// bad invocations
// ---------------------------------------------------------------------------

#[test]
fn empty_input_fails() {
    let dir = test_game();
    yarnturn(dir.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("end of input and not JSON"));
}

#[test]
fn missing_game_file_fails() {
    let dir = TempDir::new().unwrap();
    yarnturn(dir.path())
        .write_stdin(START)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load game file"));
}

#[test]
fn missing_game_argument_is_usage_error() {
    Command::cargo_bin("yarnturn")
        .unwrap()
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: ").and(predicate::str::contains("Usage")));
}

#[test]
fn unknown_flag_exits_one() {
    let dir = test_game();
    yarnturn(dir.path())
        .arg("--bogus")
        .write_stdin(START)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"));
    assert!(!dir.path().join("autosave.json").exists());
}

#[test]
fn help_and_version_succeed() {
    Command::cargo_bin("yarnturn")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--autodir"));
    Command::cargo_bin("yarnturn")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("yarnturn"));
}
