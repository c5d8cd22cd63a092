use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("zhipin_greeter")
}

#[test]
fn test_help_lists_options() {
    let mut cmd = Command::new(get_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--record"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_missing_config_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(get_bin());
    cmd.current_dir(dir.path());

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Config file not found"))
        .stdout(predicate::str::contains("Starting browser").not());

    assert!(!dir.path().join("delivered.json").exists());
}

#[test]
fn test_missing_config_at_custom_path() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(get_bin());
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg("settings/boss.json");

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("settings/boss.json"));
}

#[test]
fn test_invalid_config_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{
            "browser": { "headless": true, "window_size": "1920,1080" },
            "search": { "keyword": "rust" },
            "delivery": {
                "greeting": "hello",
                "min_delay": 10,
                "max_delay": 2,
                "daily_limit": 5
            }
        }"#,
    )
    .unwrap();

    let mut cmd = Command::new(get_bin());
    cmd.current_dir(dir.path());

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid config"))
        .stdout(predicate::str::contains("Starting browser").not());
}

#[test]
fn test_malformed_config_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let mut cmd = Command::new(get_bin());
    cmd.current_dir(dir.path());

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to parse config"));
}
