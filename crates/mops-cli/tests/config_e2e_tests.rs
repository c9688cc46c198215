//! End-to-end tests for `mops config` and `mops job`

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn mops() -> Command {
    let mut cmd = Command::cargo_bin("mops").unwrap();
    cmd.env_remove("MOPS_CONFIG")
        .env_remove("MOPS_CONFIG_BLOB")
        .env("LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_encode_then_decode_through_env() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("svc.json");
    fs::write(&config_path, r#"{"channel": "news", "http": {"timeout_secs": 9}}"#).unwrap();

    let output = mops()
        .args(["config", "encode"])
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let blob = String::from_utf8(output.stdout).unwrap();

    mops()
        .args(["config", "decode"])
        .env("MOPS_CONFIG_BLOB", blob.trim())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"channel\": \"news\""));

    mops()
        .args(["config", "validate"])
        .env("MOPS_CONFIG_BLOB", blob.trim())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"http_timeout_secs\": 9"));
}

#[test]
fn test_unknown_status_backend_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("svc.json");
    fs::write(&config_path, r#"{"status_manager": {"type": "redis"}}"#).unwrap();

    mops()
        .args(["config", "validate", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("redis"));
}

#[test]
fn test_encode_missing_file() {
    mops()
        .args(["config", "encode", "/nonexistent/svc.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[tokio::test]
async fn test_job_status_queries_mapsor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .and(query_param("token", "k"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "RUNNING"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("svc.json");
    let config = serde_json::json!({
        "mapsor_details": {"mapsor_url": server.uri(), "mapsor_key": "k"}
    });
    fs::write(&config_path, config.to_string()).unwrap();

    mops()
        .args(["job", "status", "job-1", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("RUNNING"));
}

#[test]
fn test_job_without_mapsor_section() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("svc.json");
    fs::write(&config_path, "{}").unwrap();

    mops()
        .args(["job", "logs", "job-1", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mapsor_details"));
}
