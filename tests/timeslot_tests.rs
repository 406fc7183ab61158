mod test_env;
// Timeslot editing through the CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    (temp_dir, guard)
}

fn new_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tasktimer").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn list_json(temp_dir: &TempDir) -> Value {
    let output = new_cmd(temp_dir).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_slot_begin_and_end() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir)
        .args(["slot", "begin", "2", "00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Timeslot 2 now begins at 00:00"));

    new_cmd(&temp_dir)
        .args(["slot", "end", "2", "0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Timeslot 2 now ends at 00:01"));

    let json = list_json(&temp_dir);
    let task = &json["tasks"][0];
    assert_eq!(task["isActive"], false);
    assert_eq!(task["duration"], 60);
    assert_eq!(task["timeslots"][0]["duration"], 60);
}

#[test]
fn test_slot_end_before_begin_gives_negative_duration() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir).args(["slot", "begin", "2", "00:10"]).assert().success();
    new_cmd(&temp_dir).args(["slot", "end", "2", "00:05"]).assert().success();

    assert_eq!(list_json(&temp_dir)["tasks"][0]["duration"], -300);
    new_cmd(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("-5m"));
}

#[test]
fn test_slot_malformed_time_is_rejected() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();

    for bad in ["25:00", "9:5", "abc", "12:60"] {
        new_cmd(&temp_dir)
            .args(["slot", "begin", "2", bad])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid time"));
    }

    // The timeslot is untouched and still running
    assert_eq!(list_json(&temp_dir)["tasks"][0]["isActive"], true);
}

#[test]
fn test_slot_unknown_id() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir)
        .args(["slot", "end", "9", "10:00"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Timeslot 9 not found"));
}

#[test]
fn test_slot_remove_resets_ids_when_empty() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir)
        .args(["slot", "remove", "2", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed timeslot 2"));

    let json = list_json(&temp_dir);
    assert_eq!(json["tasks"][0]["isActive"], false);
    assert!(json["tasks"][0]["timeslots"].as_array().unwrap().is_empty());

    // The task still exists, so the counter keeps going
    new_cmd(&temp_dir)
        .args(["add", "Next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 3: Next"));
}

#[test]
fn test_slot_remove_prompt() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir)
        .args(["slot", "remove", "2"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."))
        .stderr(predicate::str::contains("of Write? [y/N]"));
}

#[test]
fn test_slot_assign() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "A"]).assert().success();
    new_cmd(&temp_dir).args(["add", "B"]).assert().success();

    new_cmd(&temp_dir)
        .args(["slot", "assign", "2", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Timeslot 2 now belongs to task 3"));

    let json = list_json(&temp_dir);
    let b = json["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == 3)
        .unwrap()
        .clone();
    assert_eq!(b["timeslots"].as_array().unwrap().len(), 2);

    new_cmd(&temp_dir)
        .args(["slot", "assign", "2", "8"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task 8 not found"));
}

#[test]
fn test_slot_split_into_new_subtask() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir).arg("stop").assert().success();

    new_cmd(&temp_dir)
        .args(["slot", "split", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved timeslot 2 to new task 3"));

    let json = list_json(&temp_dir);
    let sub = &json["tasks"][0]["subTasks"][0];
    assert_eq!(sub["id"], 3);
    assert!(sub.get("name").is_none());
    assert_eq!(sub["timeslots"][0]["id"], 2);
}
