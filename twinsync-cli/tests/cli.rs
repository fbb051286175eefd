use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn twinsync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("twinsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(root: &Path, rel: &str, content: &str, unix_secs: i64) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    set_file_mtime(&path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().expect("canonicalize")
}

fn configure(home: &TempDir, primary: &TempDir, secondary: &TempDir, mode: &str) {
    twinsync_cmd(home.path())
        .args(["config", "set", "--primary"])
        .arg(primary.path())
        .arg("--secondary")
        .arg(secondary.path())
        .args(["--mode", mode])
        .assert()
        .success()
        .stdout(contains("preferences saved"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn version_names_the_binary() {
    let home = TempDir::new().unwrap();
    twinsync_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(format!("twinsync {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn config_show_without_preferences_prints_defaults() {
    let home = TempDir::new().unwrap();
    twinsync_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("none"))
        .stdout(contains("BI_DIRECTIONAL"));
}

#[test]
fn config_set_then_show_round_trips() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();

    configure(&home, &primary, &secondary, "one-directional");

    let assert = twinsync_cmd(home.path())
        .args(["config", "show", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let shown: serde_json::Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(shown["sync_mode"], "ONE_DIRECTIONAL");
    assert_eq!(
        PathBuf::from(shown["primary_dir"].as_str().unwrap()),
        canonical(primary.path())
    );
    assert_eq!(
        PathBuf::from(shown["secondary_dir"].as_str().unwrap()),
        canonical(secondary.path())
    );
}

#[test]
fn config_set_mode_only_keeps_directories() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    configure(&home, &primary, &secondary, "one-directional");

    twinsync_cmd(home.path())
        .args(["config", "set", "--mode", "BI_DIRECTIONAL"])
        .assert()
        .success();

    twinsync_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("BI_DIRECTIONAL"))
        .stdout(contains(canonical(primary.path()).display().to_string()));
}

#[test]
fn config_set_rejects_missing_directory_and_saves_nothing() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();

    twinsync_cmd(home.path())
        .args(["config", "set", "--primary"])
        .arg(primary.path())
        .args(["--secondary", "/definitely/not/here/twinsync"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));

    assert!(!home.path().join(".twinsync/preferences.yaml").exists());
}

#[test]
fn config_set_rejects_unknown_mode() {
    let home = TempDir::new().unwrap();
    twinsync_cmd(home.path())
        .args(["config", "set", "--mode", "sideways"])
        .assert()
        .failure()
        .stderr(contains("unknown sync mode"));
}

#[test]
fn config_set_requires_both_directories() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();

    twinsync_cmd(home.path())
        .args(["config", "set", "--primary"])
        .arg(primary.path())
        .assert()
        .failure()
        .stderr(contains("secondary directory is not configured"));
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

#[test]
fn sync_without_preferences_asks_for_config() {
    let home = TempDir::new().unwrap();
    twinsync_cmd(home.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("twinsync config set"));
}

#[test]
fn sync_uses_stored_preferences_and_reports_progress() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    write_file(primary.path(), "folder/subtest1.txt", "subtest 1", 1_000);
    configure(&home, &primary, &secondary, "bi-directional");

    twinsync_cmd(home.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("Synchronizing (100%)"))
        .stdout(contains("1 visited"))
        .stdout(contains("1 copied"));

    assert_eq!(
        fs::read_to_string(secondary.path().join("folder/subtest1.txt")).unwrap(),
        "subtest 1"
    );
}

#[test]
fn sync_flags_override_stored_mode() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    write_file(secondary.path(), "only-secondary.txt", "s", 1_000);
    configure(&home, &primary, &secondary, "bi-directional");

    twinsync_cmd(home.path())
        .args(["sync", "--mode", "one-directional"])
        .assert()
        .success()
        .stdout(contains("0 copied"));

    assert!(!primary.path().join("only-secondary.txt").exists());
}

#[test]
fn sync_json_report_without_stored_preferences() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    write_file(primary.path(), "a.txt", "a", 2_000);
    write_file(secondary.path(), "a.txt", "old", 1_000);
    write_file(secondary.path(), "b.txt", "b", 1_000);

    let assert = twinsync_cmd(home.path())
        .arg("sync")
        .arg("--primary")
        .arg(primary.path())
        .arg("--secondary")
        .arg(secondary.path())
        .arg("--json")
        .assert()
        .success()
        .stdout(contains("Synchronizing").not());
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("json report");

    assert_eq!(report["mode"], "BI_DIRECTIONAL");
    assert_eq!(report["visited"], 1);
    assert_eq!(report["copied_to_secondary"], 1);
    assert_eq!(report["copied_to_primary"], 1);
    assert_eq!(fs::read_to_string(secondary.path().join("a.txt")).unwrap(), "a");
    assert!(primary.path().join("b.txt").exists());
    assert!(
        !home.path().join(".twinsync/preferences.yaml").exists(),
        "flags must not be persisted"
    );
}

#[test]
fn sync_fails_when_directory_vanished() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    configure(&home, &primary, &secondary, "bi-directional");
    let gone = canonical(secondary.path());
    drop(secondary);

    twinsync_cmd(home.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("is not ready"))
        .stderr(contains(gone.display().to_string()));
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

#[test]
fn sync_writes_log_file() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    write_file(primary.path(), "a.txt", "a", 1_000);
    configure(&home, &primary, &secondary, "bi-directional");

    twinsync_cmd(home.path())
        .arg("sync")
        .assert()
        .success()
        .stderr(contains("sync finished").not());

    let log = fs::read_to_string(home.path().join(".twinsync/logs/twinsync.log")).unwrap();
    assert!(log.contains("sync started"));
    assert!(log.contains("copy a.txt ->"));
    assert!(log.contains("sync finished"));
}

#[test]
fn first_run_is_not_reported_as_a_warning() {
    let home = TempDir::new().unwrap();
    twinsync_cmd(home.path())
        .args(["config", "show", "--verbose"])
        .assert()
        .success()
        .stderr(contains("WARN").not())
        .stderr(contains("no preferences stored yet").not());
}

#[test]
fn verbose_mirrors_log_to_stderr() {
    let home = TempDir::new().unwrap();
    let primary = TempDir::new().unwrap();
    let secondary = TempDir::new().unwrap();
    configure(&home, &primary, &secondary, "bi-directional");

    twinsync_cmd(home.path())
        .args(["sync", "--verbose"])
        .assert()
        .success()
        .stderr(contains("sync finished"));
}
