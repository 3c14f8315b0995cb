//! Integration tests for the `prepwise` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! the offline contact directory and error exit codes, all without a
//! running portal backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

const PREPWISE_VARS: &[&str] = &[
    "PREPWISE_PROFILE",
    "PREPWISE_BACKEND",
    "PREPWISE_OUTPUT",
    "PREPWISE_INSECURE",
    "PREPWISE_TIMEOUT",
    "PREPWISE_PASSWORD",
    "PREPWISE_WEATHER_KEY",
    "PREPWISE_GEMINI_KEY",
    "PREPWISE_SEARCH_KEY",
    "PREPWISE_MAPS_KEY",
    "PREPWISE_SEARCH_CX",
];

/// Build a command for the `prepwise` binary with env isolation.
///
/// Every platform directory points into `home`, the keyring is disabled
/// and the backend is an address nothing listens on.
fn prepwise_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("prepwise");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_RUNTIME_DIR", home.join("run"))
        .env("PREPWISE_DEFAULTS__KEYRING", "false")
        .env("RUST_LOG", "off");
    for var in PREPWISE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("PREPWISE_BACKEND", "http://127.0.0.1:9/api");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("alerts")
                .and(predicate::str::contains("drills"))
                .and(predicate::str::contains("contacts")),
        );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prepwise"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Catalogues ──────────────────────────────────────────────────────

#[test]
fn test_drills_list_json() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["drills", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let drills = json_stdout(&output);
    let drills = drills.as_array().unwrap();
    assert_eq!(drills.len(), 3);
    assert_eq!(drills[0]["title"], "Earthquake Evacuation Drill");
}

#[test]
fn test_drills_show_unknown_is_not_found() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["drills", "show", "volcano"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_modules_list_in_progress_plain() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .args(["modules", "list", "--tab", "in-progress", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::eq("2\n3\n"));
}

#[test]
fn test_modules_list_rejects_unknown_tab() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["modules", "list", "--tab", "favourites"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Offline contacts ────────────────────────────────────────────────

#[test]
fn test_contacts_offline_seeds_defaults() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["contacts", "--offline", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let contacts = json_stdout(&output);
    assert_eq!(contacts.as_array().unwrap().len(), 8);

    // Seeding again adds nothing: every default is already present.
    prepwise_cmd(home.path())
        .args(["contacts", "--offline", "seed"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Added 0"));
}

#[test]
fn test_contacts_offline_add_and_search() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .args([
            "contacts",
            "--offline",
            "add",
            "--name",
            "Ward Office",
            "--phone",
            "022-555",
            "--kind",
            "disaster-management",
        ])
        .assert()
        .success();

    let output = prepwise_cmd(home.path())
        .args(["contacts", "--offline", "list", "--search", "ward", "-o", "json"])
        .output()
        .unwrap();
    let found = json_stdout(&output);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Ward Office");
}

#[test]
fn test_contacts_offline_csv_import() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("team.csv");
    std::fs::write(
        &file,
        "name,phone,type\nSchool Nurse,555-0101,hospital\nAmbulance,102,ambulance\n,,\n",
    )
    .unwrap();

    let output = prepwise_cmd(home.path())
        .args(["contacts", "--offline", "import", "-o", "json"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let report = json_stdout(&output);
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["merged"], 1);
    assert_eq!(report["skipped"], 1);
}

#[test]
fn test_contacts_vcard_needs_single_contact() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["contacts", "--offline", "export", "--format", "vcard"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_contacts_remove_requires_yes_without_tty() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["contacts", "--offline", "remove", "Ambulance"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_weather_without_key_is_auth_error() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["weather", "--lat", "19.07", "--lng", "72.87"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("PREPWISE_WEATHER_KEY"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["--profile", "nowhere", "drills", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nowhere"));
}

#[test]
fn test_admin_stats_requires_login() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .arg("admin-stats")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_home() {
    let home = TempDir::new().unwrap();
    prepwise_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    let output = prepwise_cmd(home.path())
        .args(["config", "use", "staging"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
