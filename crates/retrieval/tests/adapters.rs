//! Pinecone and Qdrant adapters against local mock servers.

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use ragchat_retrieval::{Error, PineconeStore, QdrantStore, VectorStore, index_host};
use serde_json::{Value, json};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

async fn pinecone_query(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("pc-key") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    assert_eq!(body["topK"], 2);
    assert_eq!(body["includeMetadata"], true);
    assert_eq!(body["vector"], json!([0.5, 0.5]));
    Ok(Json(json!({
        "matches": [
            {"id": "a", "score": 0.92, "metadata": {"text": "first chunk", "source": "a.pdf"}},
            {"id": "b", "score": 0.71, "metadata": {"text": "second chunk"}}
        ],
        "namespace": ""
    })))
}

#[tokio::test]
async fn pinecone_query_maps_matches() {
    let host = spawn(Router::new().route("/query", post(pinecone_query))).await;
    let store = PineconeStore::new(llm::Client::new(), "pc-key", &host, "pdf");

    assert_eq!(store.name(), "pdf");
    let docs = store.search(&[0.5, 0.5], 2).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "a");
    assert_eq!(docs[0].text, "first chunk");
    assert_eq!(docs[0].metadata, json!({"source": "a.pdf"}));
    assert_eq!(docs[1].text, "second chunk");
}

#[tokio::test]
async fn pinecone_surfaces_http_status() {
    let host = spawn(Router::new().route("/query", post(pinecone_query))).await;
    let store = PineconeStore::new(llm::Client::new(), "wrong", &host, "pdf");

    let err = store.search(&[0.5, 0.5], 2).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Status {
            service: "pinecone",
            status: 401,
            ..
        }
    ));
}

#[test]
fn pinecone_host_gets_https_scheme() {
    let store = PineconeStore::new(
        llm::Client::new(),
        "k",
        "pdf-abc123.svc.us-west1-gcp.pinecone.io/",
        "pdf",
    );
    assert_eq!(store.host(), "https://pdf-abc123.svc.us-west1-gcp.pinecone.io");
    assert_eq!(
        index_host("pdf", "abc123", "us-west1-gcp"),
        "pdf-abc123.svc.us-west1-gcp.pinecone.io"
    );
}

async fn qdrant_search(
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    assert_eq!(collection, "docs");
    assert_eq!(
        headers.get("api-key").and_then(|v| v.to_str().ok()),
        Some("qd-key")
    );
    assert_eq!(body["limit"], 3);
    assert_eq!(body["with_payload"], true);
    Json(json!({
        "result": [
            {"id": 42, "version": 1, "score": 0.8, "payload": {"page_content": "numbered point"}},
            {"id": "7f1c", "version": 1, "score": 0.4, "payload": {"text": "uuid point"}}
        ],
        "status": "ok",
        "time": 0.001
    }))
}

#[tokio::test]
async fn qdrant_search_maps_points() {
    let url = spawn(Router::new().route(
        "/collections/{collection}/points/search",
        post(qdrant_search),
    ))
    .await;
    let store = QdrantStore::new(llm::Client::new(), &url, "docs").with_api_key("qd-key");

    let docs = store.search(&[1.0], 3).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "42");
    assert_eq!(docs[0].text, "numbered point");
    assert_eq!(docs[1].id, "7f1c");
    assert_eq!(docs[1].text, "uuid point");
}
