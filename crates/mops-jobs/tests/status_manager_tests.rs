//! Status manager behaviour through the public API, one test per backend
//! for each shared guarantee.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mops_jobs::status::{
    get_status_manager_by_kind, BackendKind, ChicaneConfig, ChicaneStatus, DynamoDbStatus,
    HistoryCache, MemoryStatusTable, PublishOptions, StatusBody, StatusManager,
};
use mops_jobs::{HttpSettings, JobsError};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn chicane(server: &MockServer, history: serde_json::Value) -> Box<dyn StatusManager> {
    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "agent-1"}])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history))
        .mount(server)
        .await;

    let config = ChicaneConfig {
        url: Some(format!("{}/status", server.uri())),
        get_agents_url: Some(format!("{}/agents", server.uri())),
        body: Some(StatusBody::new("agent-1", "transcode")),
        shared_cache: false,
        cache_ttl_secs: None,
        http: HttpSettings::default(),
    };
    Box::new(
        ChicaneStatus::connect(&config, Arc::new(HistoryCache::new()))
            .await
            .unwrap(),
    )
}

async fn table_backend() -> Box<dyn StatusManager> {
    let table = Arc::new(MemoryStatusTable::new("job-status"));
    Box::new(DynamoDbStatus::new(table, "transcode").await.unwrap())
}

#[tokio::test]
async fn test_unpublished_asset_has_no_status() {
    let server = MockServer::start().await;
    let backends = vec![
        chicane(
            &server,
            json!([{"history": [{"job-id": "transcode-1", "timestamp": "t1"}]}]),
        )
        .await,
        table_backend().await,
    ];

    for backend in backends {
        let last = backend.get_last_status("never-published").await.unwrap();
        assert!(last.is_none(), "{} returned a status", backend.kind());
    }
}

#[tokio::test]
async fn test_other_job_types_are_invisible() {
    let server = MockServer::start().await;
    let http = chicane(
        &server,
        json!([{"history": [
            {"job-id": "othertype-42", "timestamp": "t1"},
            {"job-id": "transcode-43", "timestamp": "t2"}
        ]}]),
    )
    .await;

    let all = http.get_status().await.unwrap();
    assert_eq!(all.keys().collect::<Vec<_>>(), vec!["43"]);
    assert!(http.get_last_status("42").await.unwrap().is_none());

    let table = Arc::new(MemoryStatusTable::existing("job-status"));
    let other = DynamoDbStatus::new(table.clone(), "othertype").await.unwrap();
    other
        .publish_status("done", "42", PublishOptions::new())
        .await
        .unwrap();
    let transcode = DynamoDbStatus::new(table, "transcode").await.unwrap();
    assert!(transcode.get_status().await.unwrap().is_empty());
    assert!(transcode.get_last_status("42").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_backend_kind_is_rejected() {
    for kind in ["unknown", "redis", ""] {
        let result = get_status_manager_by_kind(kind, json!({})).await;
        assert!(matches!(result, Err(JobsError::Config(_))), "kind {kind:?} accepted");
    }
}

#[test]
fn test_backend_kind_round_trips_through_display() {
    for kind in [BackendKind::Chicane, BackendKind::DynamoDb] {
        assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
    }
}
