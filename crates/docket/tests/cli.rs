use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dkt(root: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("dkt").into();
    cmd.arg("--root").arg(root);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("DOCKET_SOURCE_CONTAINER");
    cmd.env_remove("DOCKET_DESTINATION_CONTAINER");
    cmd
}

#[test]
fn binary_runs() {
    let mut cmd: Command = cargo_bin_cmd!("dkt").into();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dkt"));
}

#[test]
fn init_creates_both_containers() {
    let tmp = TempDir::new().unwrap();

    dkt(tmp.path()).arg("init").assert().success();

    assert!(tmp.path().join("incoming").is_dir());
    assert!(tmp.path().join("processed").is_dir());
}

#[test]
fn init_is_idempotent() {
    let tmp = TempDir::new().unwrap();

    dkt(tmp.path()).arg("init").assert().success();
    dkt(tmp.path()).arg("init").assert().success();

    assert!(tmp.path().join("incoming").is_dir());
}

#[test]
fn process_requires_analysis_configuration() {
    let tmp = TempDir::new().unwrap();
    dkt(tmp.path()).arg("init").assert().success();

    dkt(tmp.path())
        .env_remove("DOCKET_ANALYSIS_ENDPOINT")
        .env_remove("DOCKET_ANALYSIS_KEY")
        .args(["process", "notice.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOCKET_ANALYSIS_ENDPOINT"));
}

#[test]
fn sweep_over_empty_container_reports_zero() {
    let tmp = TempDir::new().unwrap();
    dkt(tmp.path()).arg("init").assert().success();

    dkt(tmp.path())
        .env("DOCKET_ANALYSIS_ENDPOINT", "https://analysis.invalid/analyze")
        .env("DOCKET_ANALYSIS_KEY", "unused")
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("processed 0 document(s)"));
}

#[test]
fn process_missing_document_fails_with_status() {
    let tmp = TempDir::new().unwrap();
    dkt(tmp.path()).arg("init").assert().success();

    dkt(tmp.path())
        .env("DOCKET_ANALYSIS_ENDPOINT", "https://analysis.invalid/analyze")
        .env("DOCKET_ANALYSIS_KEY", "unused")
        .args(["process", "missing.pdf"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("BlobMetadataError"));
}
