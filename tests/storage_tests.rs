mod test_env;
// Persistence of the snapshot and rc configuration

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
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

fn snapshot_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join(".tasktimer").join("time-tracker.json")
}

#[test]
fn test_snapshot_layout() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();

    let raw = fs::read_to_string(snapshot_path(&temp_dir)).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["nextId"], 3);
    assert_eq!(json["tasksById"]["1"]["name"], "Write");
    assert_eq!(json["timeslotsById"]["2"]["taskId"], 1);
    assert!(json["timeslotsById"]["2"].get("end").is_none());
}

#[test]
fn test_list_does_not_write() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir).arg("list").assert().success();
    assert!(!snapshot_path(&temp_dir).exists());
}

#[test]
fn test_malformed_snapshot_starts_fresh() {
    let (temp_dir, _guard) = setup_test_env();
    let path = snapshot_path(&temp_dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    new_cmd(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks."))
        .stderr(predicate::str::contains("malformed stored state"));

    new_cmd(&temp_dir)
        .args(["add", "Fresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 1: Fresh"));
}

#[test]
fn test_stale_id_counter_is_repaired() {
    let (temp_dir, _guard) = setup_test_env();
    let path = snapshot_path(&temp_dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{"nextId":1,"tasksById":{"5":{"id":5,"name":"Old"}},"timeslotsById":{}}"#,
    )
    .unwrap();

    new_cmd(&temp_dir)
        .args(["add", "New"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 6: New"));
}

#[test]
fn test_data_location_from_rc() {
    let (temp_dir, _guard) = setup_test_env();
    let config_dir = temp_dir.path().join(".tasktimer");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), "# test config\ndata.location=data\n").unwrap();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();

    assert!(config_dir.join("data").join("time-tracker.json").exists());
    assert!(!snapshot_path(&temp_dir).exists());
}

#[test]
fn test_duration_units_from_rc() {
    let (temp_dir, _guard) = setup_test_env();
    let config_dir = temp_dir.path().join(".tasktimer");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), "duration.seconds=false\n").unwrap();

    new_cmd(&temp_dir).args(["add", "Write"]).assert().success();
    new_cmd(&temp_dir).args(["slot", "begin", "2", "00:00"]).assert().success();
    new_cmd(&temp_dir).args(["slot", "end", "2", "00:02"]).assert().success();

    new_cmd(&temp_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2m"))
        .stdout(predicate::str::contains("Total: 2m0s").not());
}

#[test]
fn test_invalid_rc_is_reported() {
    let (temp_dir, _guard) = setup_test_env();
    let config_dir = temp_dir.path().join(".tasktimer");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        "duration.days=false\nduration.hours=false\nduration.minutes=false\nduration.seconds=false\n",
    )
    .unwrap();

    new_cmd(&temp_dir)
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Internal error"));
}
