//! HTTP-level tests of the research UI and JSON endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine};
use common::*;
use research_crew::web::{self, handlers::ResearchResponse};
use research_crew::Crew;
use serde_json::json;
use wiremock::MockServer;

const DOWNLOAD_PREFIX: &str = "href=\"data:text/markdown;charset=utf-8;base64,";

async fn create_test_server(mock: &MockServer) -> TestServer {
    let crew = Crew::new(&test_config(mock)).expect("Failed to build crew");
    TestServer::new(web::router(Arc::new(crew))).expect("Failed to create test server")
}

/// Decodes the bytes behind the page's download link.
fn downloaded_bytes(page: &str) -> Option<Vec<u8>> {
    let start = page.find(DOWNLOAD_PREFIX)? + DOWNLOAD_PREFIX.len();
    let end = start + page[start..].find('"')?;
    STANDARD.decode(&page[start..end]).ok()
}

#[tokio::test]
async fn test_health_check() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_index_shows_idle_form() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains(r#"<form method="post" action="/run""#));
    assert!(page.contains("Run Research Crew"));
    assert!(downloaded_bytes(&page).is_none());
}

#[tokio::test]
async fn test_empty_topic_shows_topic_required() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock).await;

    let response = server.post("/run").form(&[("topic", "   ")]).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text();
    assert!(page.contains(r#"id="topic-required""#));
    assert!(downloaded_bytes(&page).is_none());
    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_topic_field_shows_topic_required() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock).await;

    let response = server.post("/run").form(&[("other", "x")]).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains(r#"id="topic-required""#));
}

#[tokio::test]
async fn test_completed_run_download_matches_report() {
    let mock = MockServer::start().await;
    mount_wiki(&mock).await;
    mount_search(&mock, 7).await;
    mount_llm(&mock, REPORT).await;
    let server = create_test_server(&mock).await;

    let response = server.post("/run").form(&[("topic", "Solar power")]).await;
    response.assert_status_ok();
    let page = response.text();

    assert!(page.contains("<h1>Solar power</h1>"));
    assert!(page.contains(r#"download="report_"#));
    let bytes = downloaded_bytes(&page).expect("download link present");
    assert_eq!(bytes, REPORT.trim().as_bytes());
}

#[tokio::test]
async fn test_llm_failure_shows_error_without_download() {
    let mock = MockServer::start().await;
    mount_wiki(&mock).await;
    mount_search(&mock, 2).await;
    mount_llm_failing_after(&mock, 1).await;
    let server = create_test_server(&mock).await;

    let response = server.post("/run").form(&[("topic", "Solar power")]).await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let page = response.text();
    assert!(page.contains(r#"id="run-error""#));
    assert!(page.contains("summarizer stage failed"));
    assert!(downloaded_bytes(&page).is_none());
    // The topic stays in the field so the user can retry.
    assert!(page.contains(r#"value="Solar power""#));
}

#[tokio::test]
async fn test_wikipedia_outage_still_renders_report() {
    let mock = MockServer::start().await;
    mount_search(&mock, 2).await;
    mount_llm(&mock, REPORT).await;
    let server = create_test_server(&mock).await;

    let response = server.post("/run").form(&[("topic", "Solar power")]).await;
    response.assert_status_ok();
    assert_eq!(
        downloaded_bytes(&response.text()).unwrap(),
        REPORT.trim().as_bytes()
    );
}

#[tokio::test]
async fn test_api_research_returns_markdown() {
    let mock = MockServer::start().await;
    mount_wiki(&mock).await;
    mount_search(&mock, 3).await;
    mount_llm(&mock, REPORT).await;
    let server = create_test_server(&mock).await;

    let response = server
        .post("/api/research")
        .json(&json!({ "topic": "Solar power." }))
        .await;
    response.assert_status_ok();

    let body: ResearchResponse = response.json();
    assert_eq!(body.topic, "Solar power.");
    assert_eq!(body.title, "Solar power");
    assert_eq!(body.markdown, REPORT.trim());
    assert!(body.file_name.starts_with("report_") && body.file_name.ends_with(".md"));
    assert!(!body.run_id.is_empty());
}

#[tokio::test]
async fn test_api_research_errors_are_json() {
    let mock = MockServer::start().await;
    mount_llm_failing_after(&mock, 0).await;
    let server = create_test_server(&mock).await;

    let response = server.post("/api/research").json(&json!({ "topic": "" })).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "topic is required");

    let response = server
        .post("/api/research")
        .json(&json!({ "topic": "Solar power" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("researcher stage failed"));
}
