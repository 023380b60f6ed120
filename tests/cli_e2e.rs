//! End-to-end CLI tests for the aip-compiler binary.

#![allow(deprecated)]

mod support;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use support::aip_server::{base_url, publish_pdf, publish_reference_aip};
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::MockServer;

/// Command isolated from the user's config and working directory.
fn compiler_cmd(workdir: &Path) -> Command {
    let config_home = workdir.join("xdg-config");
    std::fs::create_dir_all(&config_home).unwrap();

    let mut cmd = Command::cargo_bin("aip-compiler").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", &config_home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn compile_args(cmd: &mut Command, server: &MockServer, out: &Path) {
    cmd.arg("--as-of")
        .arg("2025-02")
        .arg("--base-url")
        .arg(base_url(server))
        .arg("-o")
        .arg(out)
        .arg("--min-file-size")
        .arg("0");
}

#[test]
fn test_binary_help_displays_usage() {
    let dir = TempDir::new().unwrap();
    compiler_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uruguayan AIP"))
        .stdout(predicate::str::contains("--as-of"));
}

#[test]
fn test_binary_version_displays_version() {
    let dir = TempDir::new().unwrap();
    compiler_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aip-compiler"));
}

#[test]
fn test_binary_rejects_invalid_period() {
    let dir = TempDir::new().unwrap();
    compiler_cmd(dir.path())
        .args(["--as-of", "2025-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_zero_workers() {
    let dir = TempDir::new().unwrap();
    compiler_cmd(dir.path())
        .args(["--workers", "0"])
        .assert()
        .failure();
}

#[tokio::test]
async fn test_binary_compiles_and_prints_json_report() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    publish_reference_aip(&server).await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let log = dir.path().join("logs").join("run.log");

    let mut cmd = compiler_cmd(dir.path());
    compile_args(&mut cmd, &server, &out);
    let assert = cmd.arg("--log-file").arg(&log).arg("--json").assert().success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["period"], "2025-02");
    assert_eq!(report["pages"], 8);
    assert_eq!(report["failed"], 0);
    assert!(out.join("aip_uruguay_compiled_2025-02.pdf").is_file());

    let log_text = std::fs::read_to_string(&log).unwrap();
    assert!(log_text.contains("probe"));
    assert!(log_text.contains("compilation written"));
}

#[tokio::test]
async fn test_binary_prints_summary_with_omitted_group() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    publish_pdf(&server, "2025-02", "Gen0.pdf", "GEN0").await;
    let dir = TempDir::new().unwrap();

    let mut cmd = compiler_cmd(dir.path());
    compile_args(&mut cmd, &server, dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("aip_uruguay_compiled_2025-02.pdf"))
        .stdout(predicate::str::contains("Heading: not found"));

    assert!(dir.path().join("aip_download.log").is_file());
}

#[tokio::test]
async fn test_binary_strict_incomplete_exits_two() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    publish_pdf(&server, "2025-02", "Gen0.pdf", "GEN0").await;
    let dir = TempDir::new().unwrap();

    let mut cmd = compiler_cmd(dir.path());
    compile_args(&mut cmd, &server, dir.path());
    let assert = cmd.arg("--strict").arg("-q").assert().failure();

    assert_eq!(assert.get_output().status.code(), Some(2));
    assert!(dir.path().join("aip_uruguay_compiled_2025-02.pdf").is_file());
}

#[tokio::test]
async fn test_binary_nothing_published_exits_one_without_output() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let log = dir.path().join("run.log");

    let mut cmd = compiler_cmd(dir.path());
    compile_args(&mut cmd, &server, &out);
    let assert = cmd
        .arg("--lookback")
        .arg("3")
        .arg("--log-file")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no AIP documents could be compiled"));

    assert_eq!(assert.get_output().status.code(), Some(1));
    assert!(!out.join("aip_uruguay_compiled_2025-02.pdf").exists());

    let log_text = std::fs::read_to_string(&log).unwrap();
    for group in ["Heading", "General", "EnRoute", "Aerodromes", "Additional_Aerodromes", "Amendment"] {
        assert!(
            log_text
                .lines()
                .any(|line| line.contains("no revision found")
                    && line.contains(&format!("group={group} "))),
            "exhaustion of {group} should be logged"
        );
    }
}

#[tokio::test]
async fn test_binary_reads_base_url_from_config_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    publish_pdf(&server, "2025-01", "AIPAMDT.pdf", "AMDT").await;
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("aip.toml");
    std::fs::write(
        &config,
        format!("base_url = \"{}\"\nmin_file_size = 0\n", base_url(&server)),
    )
    .unwrap();

    compiler_cmd(dir.path())
        .args(["--as-of", "2025-02", "-q"])
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("aip_uruguay_compiled_2025-01.pdf").is_file());
}
