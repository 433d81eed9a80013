//! Ingestion client tests against a mock backend.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use ragchat_client::{BackendClient, IngestError};
use serde_json::{Value, json};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

/// Request bodies (or upload file names) seen by the mock, per route.
type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn upload(State(seen): State<Seen>, mut multipart: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        assert_eq!(field.name(), Some("files[]"));
        let name = field.file_name().unwrap().to_owned();
        let bytes = field.bytes().await.unwrap();
        assert!(!bytes.is_empty());
        names.push(name);
    }
    seen.lock()
        .unwrap()
        .push(("upload".into(), json!(names.clone())));
    Json(json!(names))
}

async fn process() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "No files found in the documents directory"})),
    )
}

async fn urls(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(("url".into(), body));
    Json(json!({"message": "URLs processed successfully"}))
}

async fn youtube(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(("youtube".into(), body));
    Json(json!({"message": "Transcript processed successfully"}))
}

async fn git(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(("git".into(), body));
    Json(json!({"message": "Git URL processed successfully"}))
}

async fn wipe() -> Json<Value> {
    Json(json!({"message": "Pinecone index deleted successfully"}))
}

async fn backend() -> (BackendClient, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/uploadFile", post(upload))
        .route("/process", get(process))
        .route("/url", post(urls))
        .route("/youtube", post(youtube))
        .route("/git", post(git))
        .route("/delete", delete(wipe))
        .with_state(Arc::clone(&seen));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = BackendClient::new(reqwest::Client::new(), &format!("http://{addr}/"));
    (client, seen)
}

#[tokio::test]
async fn uploads_each_file_as_files_part() {
    let (client, seen) = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    let txt = dir.path().join("notes.txt");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    std::fs::write(&txt, b"plain notes").unwrap();

    let stored = client.upload_files(&[pdf, txt]).await.unwrap();
    assert_eq!(stored, ["report.pdf", "notes.txt"]);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_reports_missing_file() {
    let (client, _) = backend().await;
    let err = client
        .upload_files(&[PathBuf::from("/definitely/not/here.pdf")])
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::File { .. }));
    assert!(matches!(
        client.upload_files(&[]).await,
        Err(IngestError::Empty(_))
    ));
}

#[tokio::test]
async fn process_error_carries_backend_message() {
    let (client, _) = backend().await;
    match client.process_files().await {
        Err(IngestError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "No files found in the documents directory");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn urls_drop_blank_entries() {
    let (client, seen) = backend().await;
    let message = client
        .process_urls(["https://a.example", "  ", "", "https://b.example "])
        .await
        .unwrap();
    assert_eq!(message, "URLs processed successfully");
    assert_eq!(
        seen.lock().unwrap()[0],
        (
            "url".to_owned(),
            json!({"urls": ["https://a.example", "https://b.example"]})
        )
    );

    assert!(matches!(
        client.process_urls(["", " "]).await,
        Err(IngestError::Empty(_))
    ));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn youtube_and_git_payloads() {
    let (client, seen) = backend().await;
    client
        .process_youtube("https://www.youtube.com/watch?v=abc")
        .await
        .unwrap();
    client
        .process_git("https://github.com/owner/repo.git")
        .await
        .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        [
            (
                "youtube".to_owned(),
                json!({"urls": "https://www.youtube.com/watch?v=abc"})
            ),
            (
                "git".to_owned(),
                json!({"git_url": "https://github.com/owner/repo.git"})
            ),
        ]
    );
}

#[tokio::test]
async fn delete_context_succeeds() {
    let (client, _) = backend().await;
    let message = client.delete_context().await.unwrap();
    assert_eq!(message, "Pinecone index deleted successfully");
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let client = BackendClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
    assert!(matches!(
        client.delete_context().await,
        Err(IngestError::Http(_))
    ));
}
