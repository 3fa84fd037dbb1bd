//! End-to-end runs of the `pi-runtime` binary.

use std::path::Path;
use std::process::{Command, Output};

fn pi(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pi-runtime"))
        .args(args)
        .env("PI_LOG_LEVEL", "error")
        .env("PI_WORKERS", "2")
        .env_remove("RUST_LOG")
        .env_remove("PI_SCHEDULE")
        .env_remove("PI_FORMULA")
        .env_remove("PI_PRECISION")
        .output()
        .expect("failed to run pi-runtime")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_create_compute_verify_dump() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("pi.db");

    let out = pi(&["create", arg(&store), "64", "--no-sync"]);
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("4 blocks of 16 digits"));

    let out = pi(&["compute", arg(&store), "--no-sync"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("succeeded 4"));

    let out = pi(&["verify", arg(&store), "--schedule", "static", "--no-sync"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("mismatches 0"));

    let out = pi(&["dump", arg(&store), "--count", "24"]);
    assert_eq!(stdout(&out), "3.243F6A8885A308D313198A2E");

    let out = pi(&["dump", arg(&store), "--from", "16", "--count", "8"]);
    assert_eq!(stdout(&out), "13198A2E");

    let out = pi(&["dump", arg(&store), "--count", "48", "--decimal"]);
    assert_eq!(
        stdout(&out),
        "3.141592653589793238462643383279502884197169399375"
    );
}

#[test]
fn test_status_json_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("pi.db");

    assert!(pi(&["create", arg(&store), "80", "--block-digits", "8", "--no-sync"])
        .status
        .success());
    assert!(pi(&["compute", arg(&store), "--limit", "3", "--no-sync"])
        .status
        .success());

    let out = pi(&["status", arg(&store), "--json"]);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value["stats"]["capacity"], 10);
    assert_eq!(value["stats"]["block_digits"], 8);
    assert_eq!(value["stats"]["computed"], 3);
    assert_eq!(value["stats"]["checked"], 0);
}

#[test]
fn test_migrate_grows_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("pi.db");

    assert!(pi(&["create", arg(&store), "32", "--no-sync"]).status.success());
    let out = pi(&["migrate", arg(&store), "64", "--no-sync"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("from 2 to 4 blocks"));
}

#[test]
fn test_store_errors_map_to_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("missing.db");

    // OpenFailed
    assert_eq!(pi(&["status", arg(&store)]).status.code(), Some(10));

    assert!(pi(&["create", arg(&store), "16", "--no-sync"]).status.success());
    // ReadNotReady
    assert_eq!(pi(&["dump", arg(&store), "--count", "4"]).status.code(), Some(32));
    // ReadOutOfBounds
    assert_eq!(
        pi(&["dump", arg(&store), "--from", "16", "--count", "1"]).status.code(),
        Some(30)
    );
    // Existing file
    assert_ne!(pi(&["create", arg(&store), "16"]).status.code(), Some(0));
}

#[test]
fn test_bad_configuration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("pi.db");
    assert!(pi(&["create", arg(&store), "16", "--no-sync"]).status.success());

    let out = pi(&["compute", arg(&store), "--workers", "0"]);
    assert_eq!(out.status.code(), Some(1));

    let out = pi(&["dump", arg(&store), "--from", "4", "--decimal"]);
    assert_eq!(out.status.code(), Some(1));
}
