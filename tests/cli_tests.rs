//! End-to-end tests for the ticktock binary.
//!
//! These tests run the compiled binary and verify:
//! - Help and version output
//! - Preset listing and configuration display
//! - Configuration errors
//! - Argument validation
//! - Completion script generation
//! - A muted, piped session running to the alarm

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn ticktock() -> Command {
    let mut cmd = Command::cargo_bin("ticktock").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Writes `content` as a config file in a fresh temp dir.
fn config_file(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, content).unwrap();
    (dir, path)
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    ticktock()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("presets"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_no_args_prints_help() {
    ticktock()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_version() {
    ticktock()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Presets & Config
// ============================================================================

#[test]
fn test_presets_default() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("none.json");

    ticktock()
        .args(["presets", "--config"])
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("10s 30s 1m 3m 5m 10m"));
}

#[test]
fn test_presets_from_config() {
    let (_dir, path) = config_file(r#"{ "presets": [45, 120] }"#);

    ticktock()
        .args(["presets", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("45s 2m"));
}

#[test]
fn test_config_shows_effective_values() {
    let (_dir, path) = config_file(r#"{ "default_duration_seconds": 90, "volume": 0.25 }"#);

    ticktock()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_duration_seconds\": 90"))
        .stdout(predicate::str::contains("\"volume\": 0.25"))
        .stdout(predicate::str::contains("\"sample_rate\": 44100"));
}

#[test]
fn test_invalid_config_volume_fails() {
    let (_dir, path) = config_file(r#"{ "volume": 3.0 }"#);

    ticktock()
        .args(["presets", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("エラー"))
        .stderr(predicate::str::contains("音量"));
}

#[test]
fn test_malformed_config_fails() {
    let (_dir, path) = config_file("{ not json");

    ticktock()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("形式が不正"));
}

// ============================================================================
// Argument Validation
// ============================================================================

#[test]
fn test_run_rejects_volume_out_of_range() {
    ticktock()
        .args(["run", "--volume", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("0.0-1.0"));
}

#[test]
fn test_run_rejects_bad_duration() {
    ticktock()
        .args(["run", "--duration", "soon"])
        .assert()
        .failure();
}

#[test]
fn test_sound_rejects_unknown_kind() {
    ticktock().args(["sound", "gong"]).assert().failure();
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    ticktock()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ticktock"));
}

#[test]
fn test_completions_fish() {
    ticktock()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c ticktock"));
}

// ============================================================================
// Session
// ============================================================================

/// ミュートしたセッションをパイプ入力で実行
///
/// テスト手順:
/// 1. `ticktock run --mute --duration 1` に Enter を送って入力を閉じる
/// 期待結果: アラームのバナーが表示され、正常終了する
#[test]
fn test_muted_piped_session_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("none.json");

    ticktock()
        .args(["run", "--mute", "--duration", "1", "--config"])
        .arg(&missing)
        .write_stdin("\n")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("TIME'S UP!"));
}

#[test]
fn test_piped_quit_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("none.json");

    ticktock()
        .args(["run", "--mute", "--config"])
        .arg(&missing)
        .write_stdin("q\n")
        .timeout(std::time::Duration::from_secs(5))
        .assert()
        .success()
        .stdout(predicate::str::contains("01:00"));
}
