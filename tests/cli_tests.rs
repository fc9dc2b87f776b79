use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("marketpulse-x-{name}-{nanos}"));
    path
}

#[test]
fn config_init_then_validate_round_trips() {
    let path = temp_path("config.toml");

    let init = Command::new(env!("CARGO_BIN_EXE_marketpulse-x"))
        .args(["config", "init"])
        .arg(&path)
        .output()
        .expect("run marketpulse-x config init");
    assert!(init.status.success(), "{}", String::from_utf8_lossy(&init.stderr));
    assert!(path.exists());

    let validate = Command::new(env!("CARGO_BIN_EXE_marketpulse-x"))
        .args(["--config"])
        .arg(&path)
        .arg("config")
        .arg("validate")
        .output()
        .expect("run marketpulse-x config validate");
    let _ = fs::remove_file(&path);

    assert!(validate.status.success(), "{}", String::from_utf8_lossy(&validate.stderr));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let path = temp_path("config-existing.toml");
    fs::write(&path, "not a config").expect("seed existing file");

    let output = Command::new(env!("CARGO_BIN_EXE_marketpulse-x"))
        .args(["config", "init"])
        .arg(&path)
        .output()
        .expect("run marketpulse-x config init");
    let contents = fs::read_to_string(&path).expect("read back");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(contents, "not a config", "must not overwrite without --force");
}

#[test]
fn config_validate_rejects_a_bad_config() {
    let path = temp_path("config-bad.toml");
    fs::write(&path, "[rules]\neval_interval_secs = 0\n").expect("write bad config");

    let output = Command::new(env!("CARGO_BIN_EXE_marketpulse-x"))
        .args(["--config"])
        .arg(&path)
        .arg("config")
        .arg("validate")
        .output()
        .expect("run marketpulse-x config validate");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
}
