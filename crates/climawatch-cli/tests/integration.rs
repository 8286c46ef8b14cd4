#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `climawatch` with an empty environment, run from an empty directory so
/// no `.env` file is picked up.
fn climawatch(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("climawatch").unwrap();
    cmd.current_dir(dir.path()).env_clear();
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    climawatch(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("stabilize"))
        .stdout(predicate::str::contains("metrics"));
}

#[test]
fn metrics_without_channel_fails() {
    let dir = TempDir::new().unwrap();
    climawatch(&dir)
        .arg("metrics")
        .assert()
        .failure()
        .stderr(predicate::str::contains("THINGSPEAK_CHANNEL_ID"));
}

#[test]
fn send_without_write_key_fails() {
    let dir = TempDir::new().unwrap();
    climawatch(&dir)
        .args(["send", "--temperature", "21.5", "--humidity", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("THINGSPEAK_WRITE_API_KEY"));
}

#[test]
fn stabilize_without_write_key_fails_before_reading() {
    let dir = TempDir::new().unwrap();
    climawatch(&dir)
        .arg("stabilize")
        .env("THINGSPEAK_CHANNEL_ID", "123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("THINGSPEAK_WRITE_API_KEY"));
}

#[test]
fn notify_without_credentials_fails() {
    let dir = TempDir::new().unwrap();
    climawatch(&dir)
        .args(["notify", "--phone", "+34600000000", "hola"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TWILIO_ACCOUNT_SID"));
}

#[test]
fn invalid_thresholds_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("thresholds.yaml");
    std::fs::write(&path, "temp_optimal: 99\n").unwrap();

    climawatch(&dir)
        .args(["--thresholds", path.to_str().unwrap(), "metrics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("umbrales inválidos"));
}

#[test]
fn invalid_thresholds_env_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("thresholds.yaml");
    std::fs::write(&path, "hum_very_low: 95\n").unwrap();

    climawatch(&dir)
        .arg("metrics")
        .env("CLIMAWATCH_THRESHOLDS", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn thresholds_flag_replaces_broken_env_file() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.yaml");
    let good = dir.path().join("good.yaml");
    std::fs::write(&broken, "hum_very_low: 95\n").unwrap();
    std::fs::write(&good, "temp_high: 28\n").unwrap();

    // Gets past configuration and stops at the missing channel.
    climawatch(&dir)
        .args(["--thresholds", good.to_str().unwrap(), "metrics"])
        .env("CLIMAWATCH_THRESHOLDS", &broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("THINGSPEAK_CHANNEL_ID"))
        .stderr(predicate::str::contains("umbrales inválidos").not());
}
