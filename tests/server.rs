mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::*;
use hybrid_guide::models::ChatResponse;
use hybrid_guide::pipeline::Pipeline;
use hybrid_guide::server::serve;
use hybrid_guide::store::InMemoryStore;

async fn spawn_server(pipeline: Pipeline) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::new(pipeline)));
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_chat_endpoint_returns_answer_and_citations() {
    let (pipeline, _) = standard_pipeline();
    let base = spawn_server(pipeline).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "question": "Care este prețul biletului Adult la Louvre Museum?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: ChatResponse = resp.json().await.unwrap();
    assert!(body.answer.contains("22 EUR"));
    assert_eq!(body.citations.len(), 1);
    assert_eq!(body.citations[0].source, "structured store");
    assert_eq!(body.execution_flow, "structured + generation");
}

#[tokio::test]
async fn test_chat_rejects_blank_question() {
    let (pipeline, _) = standard_pipeline();
    let base = spawn_server(pipeline).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "question": "  " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_chat_malformed_body_uses_error_contract() {
    let (pipeline, search) = standard_pipeline();
    let base = spawn_server(pipeline).await;
    let client = reqwest::Client::new();

    for body in [r#"{"question": 42}"#, "not json", r#"{"q": "hi"}"#] {
        let resp = client
            .post(format!("{}/chat", base))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400, "body: {}", body);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
    }

    let resp = client
        .post(format!("{}/chat", base))
        .body(r#"{"question": "hi"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["code"], "bad_request");
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_chat_failure_does_not_leak_detail() {
    let pipeline = pipeline_with(
        Arc::new(InMemoryStore::new()),
        Arc::new(FakeSearch::with_hits(default_hits())),
        Arc::new(FailingGenerator),
        fast_settings(),
    );
    let base = spawn_server(pipeline).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "question": "Any safety tips?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let text = resp.text().await.unwrap();
    assert!(text.contains("internal server error"));
    assert!(!text.contains("deployment not found"));
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let (pipeline, _) = standard_pipeline();
    let base = spawn_server(pipeline).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["dependencies"]["structured_store"], "connected");
    assert_eq!(body["dependencies"]["document_search"], "initialized");
}

#[tokio::test]
async fn test_health_reports_disconnected_store() {
    let pipeline = pipeline_with(
        Arc::new(BrokenStore),
        Arc::new(FakeSearch::with_hits(Vec::new())),
        Arc::new(EchoGenerator),
        fast_settings(),
    );
    let base = spawn_server(pipeline).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["dependencies"]["structured_store"], "disconnected");
}
