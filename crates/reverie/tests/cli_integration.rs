//! CLI integration tests for the Reverie command-line interface.
//!
//! End-to-end runs use the offline hash embedding provider and a temp
//! directory for both the config file and the store snapshot, so no network
//! or home-directory state is touched.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the reverie binary.
fn reverie() -> Command {
    Command::cargo_bin("reverie").unwrap()
}

/// A temp dir with a config file pointing the store and output into it.
fn sandbox() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    let config = format!(
        r#"
        [store]
        path = "{store}"

        [generation]
        output = "{output}"
        length = 6
        "#,
        store = dir.path().join("store.json").display(),
        output = dir.path().join("out.mid").display(),
    );
    std::fs::write(&config_path, config).unwrap();
    (dir, config_path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Parsing Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    reverie()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("similar"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_version_displays() {
    reverie()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reverie"));
}

#[test]
fn test_add_requires_text() {
    reverie().arg("add").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// End-to-End Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_add_list_generate_round_trip() {
    let (dir, config) = sandbox();
    let config = config.to_str().unwrap();

    reverie()
        .args(["--config", config, "add"])
        .args([
            "music can emerge from structures",
            "semantic destruction is a creative act",
            "topology can inform melodic contours",
            "the mind moves through memory like a melody",
        ])
        .assert()
        .success();

    reverie()
        .args(["--config", config, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("topology can inform melodic contours"));

    reverie()
        .args(["--config", config, "generate", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 steps"));

    assert!(dir.path().join("out.mid").exists());
}

#[test]
fn test_generate_on_empty_store_reports_error() {
    let (dir, config) = sandbox();

    reverie()
        .args(["--config", config.to_str().unwrap(), "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));

    // No partial output is written.
    assert!(!dir.path().join("out.mid").exists());
}

#[test]
fn test_generate_rejects_unknown_strategy() {
    let (_dir, config) = sandbox();
    let config = config.to_str().unwrap();

    reverie()
        .args(["--config", config, "add", "one memory", "two memories"])
        .assert()
        .success();

    reverie()
        .args(["--config", config, "generate", "--strategy", "furthest_neighbor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("furthest_neighbor"));
}

#[test]
fn test_similar_finds_duplicate_text() {
    let (_dir, config) = sandbox();
    let config = config.to_str().unwrap();

    reverie()
        .args(["--config", config, "add", "the non-duped err", "unrelated"])
        .assert()
        .success();

    reverie()
        .args(["--config", config, "similar", "the non-duped err", "--threshold", "0.99", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("the non-duped err"));
}
