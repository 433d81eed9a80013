//! End-to-end tests for `POST /api/chat` against a served gateway.

use chain::Chain;
use futures_util::StreamExt;
use llm::{General, ScriptedProvider, reqwest::StatusCode};
use ragchat_gateway::{Gateway, ServeHandle, serve_gateway};
use retrieval::{Document, Retrieve};
use serde_json::json;
use std::time::Duration;

/// Retrieves nothing.
#[derive(Clone)]
struct NoContext;

impl Retrieve for NoContext {
    async fn retrieve(&self, _query: &str) -> retrieval::Result<Vec<Document>> {
        Ok(Vec::new())
    }
}

async fn serve(provider: ScriptedProvider) -> ServeHandle {
    let chain = Chain::new(provider, NoContext, General::new("gpt-3.5-turbo"));
    let gateway = Gateway::new(chain, ["gpt-3.5-turbo", "gpt-4"]);
    serve_gateway(gateway, "127.0.0.1:0").await.unwrap()
}

fn chat_url(handle: &ServeHandle) -> String {
    format!("{}/api/chat", handle.url())
}

#[tokio::test]
async fn streams_tokens_as_raw_bytes() {
    let handle = serve(ScriptedProvider::new(["Hi", "!"])).await;

    let response = llm::Client::new()
        .post(chat_url(&handle))
        .json(&json!({"prompt": "hello", "messages": [], "model": "gpt-3.5-turbo"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.text().await.unwrap(), "Hi!");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn history_reaches_the_model() {
    let provider = ScriptedProvider::new(["ok"]).reply("standalone");
    let handle = serve(provider.clone()).await;

    let body = json!({
        "prompt": "and then?",
        "messages": [
            {"name": "human", "text": "first"},
            {"name": "ai", "text": "answer"}
        ],
        "model": "gpt-4"
    });
    let text = llm::Client::new()
        .post(chat_url(&handle))
        .json(&body)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "ok");

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.model == "gpt-4"));
    assert_eq!(requests[1].messages.last().unwrap().content, "standalone");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejects_empty_prompt() {
    let handle = serve(ScriptedProvider::new(["never"])).await;
    let response = llm::Client::new()
        .post(chat_url(&handle))
        .json(&json!({"prompt": "  ", "messages": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejects_unlisted_model() {
    let provider = ScriptedProvider::new(["never"]);
    let handle = serve(provider.clone()).await;
    let response = llm::Client::new()
        .post(chat_url(&handle))
        .json(&json!({"prompt": "hi", "messages": [], "model": "gpt-9"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("gpt-9"));
    assert!(provider.requests().is_empty());
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejects_unknown_role_and_bad_json() {
    let handle = serve(ScriptedProvider::new(["never"])).await;
    let client = llm::Client::new();

    let response = client
        .post(chat_url(&handle))
        .json(&json!({"prompt": "hi", "messages": [{"name": "robot", "text": "x"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(chat_url(&handle))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn generation_error_breaks_the_read() {
    let handle = serve(ScriptedProvider::new(["Hi"]).fail_with("upstream reset")).await;

    let response = llm::Client::new()
        .post(chat_url(&handle))
        .json(&json!({"prompt": "hello", "messages": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.is_err());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn client_disconnect_cancels_generation() {
    let provider = ScriptedProvider::new(["first"]).stall();
    let handle = serve(provider.clone()).await;

    let response = llm::Client::new()
        .post(chat_url(&handle))
        .json(&json!({"prompt": "hello", "messages": []}))
        .send()
        .await
        .unwrap();
    let mut body = response.bytes_stream();
    assert_eq!(body.next().await.unwrap().unwrap(), "first");
    drop(body);

    let cancelled = tokio::time::timeout(Duration::from_secs(5), async {
        while !provider.stream_dropped() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(cancelled.is_ok(), "generation kept running after disconnect");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn health_reports_ok() {
    let handle = serve(ScriptedProvider::default()).await;
    let text = llm::Client::new()
        .get(format!("{}/health", handle.url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "ok");
    handle.shutdown().await.unwrap();
}
