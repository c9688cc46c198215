//! End-to-end tests for `mops status` against a mocked Chicane service

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Write a service configuration pointing at the mock server
fn write_config(dir: &TempDir, server: &MockServer) -> PathBuf {
    let config_path = dir.path().join("mops.json");
    let config = serde_json::json!({
        "status_manager": {
            "type": "chicane",
            "url": format!("{}/status", server.uri()),
            "get_agents_url": format!("{}/agents", server.uri()),
            "body": {"id": "agent-1", "type": "transcode"}
        }
    });
    fs::write(&config_path, config.to_string()).expect("Failed to write config");
    config_path
}

async fn mount_agent(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"name": "agent-1"}])),
        )
        .mount(server)
        .await;
}

fn mops() -> Command {
    let mut cmd = Command::cargo_bin("mops").unwrap();
    cmd.env_remove("MOPS_CONFIG")
        .env_remove("MOPS_CONFIG_BLOB")
        .env("LOG_LEVEL", "error");
    cmd
}

#[tokio::test]
async fn test_status_list_prints_history() {
    let server = MockServer::start().await;
    mount_agent(&server).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "history": [
                {"job-id": "transcode-42", "timestamp": "2024-01-01T00:00:00Z",
                 "additional_info": {"digest": "abc"}},
                {"job-id": "othertype-7", "timestamp": "2024-01-01T00:00:00Z"}
            ]
        }])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    mops()
        .arg("status")
        .arg("list")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"42\""))
        .stdout(predicate::str::contains("abc"))
        .stdout(predicate::str::contains("othertype").not());
}

#[tokio::test]
async fn test_status_publish_reports_outcome() {
    let server = MockServer::start().await;
    mount_agent(&server).await;
    Mock::given(method("POST"))
        .and(path("/status"))
        .and(query_param("complete", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    mops()
        .args(["status", "publish", "42", "done", "--complete", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted"));
}

#[tokio::test]
async fn test_status_last_unknown_asset_prints_null() {
    let server = MockServer::start().await;
    mount_agent(&server).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    mops()
        .args(["status", "last", "nope", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[tokio::test]
async fn test_rejected_publish_fails() {
    let server = MockServer::start().await;
    mount_agent(&server).await;
    Mock::given(method("POST"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    mops()
        .args(["status", "publish", "42", "started", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("500"));
}

#[test]
fn test_missing_config_is_reported() {
    mops()
        .args(["status", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
