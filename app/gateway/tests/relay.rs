//! Relay tests: body contents, backpressure and terminal states.

use async_stream::stream;
use axum::body::{Body, to_bytes};
use futures_util::StreamExt;
use ragchat_gateway::{RelayState, relay};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

fn tokens(items: &[&str]) -> impl futures_core::Stream<Item = anyhow::Result<String>> + Send + 'static {
    let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    stream! {
        for item in items {
            yield Ok(item);
        }
    }
}

async fn body_text(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn tokens_are_concatenated() {
    let (body, task) = relay(tokens(&["The", " quick", " fox"]));
    assert_eq!(body_text(body).await, "The quick fox");
    assert_eq!(task.await.unwrap(), RelayState::Closed);
}

#[tokio::test]
async fn empty_tokens_are_skipped() {
    let (body, task) = relay(tokens(&["", "a", "", "b", ""]));
    let mut frames = body.into_data_stream();
    let mut seen = Vec::new();
    while let Some(frame) = frames.next().await {
        seen.push(frame.unwrap());
    }
    assert_eq!(seen, ["a", "b"]);
    assert_eq!(task.await.unwrap(), RelayState::Closed);
}

#[tokio::test]
async fn empty_stream_closes_immediately() {
    let (body, task) = relay(tokens(&[]));
    assert_eq!(body_text(body).await, "");
    assert_eq!(task.await.unwrap(), RelayState::Closed);
}

#[tokio::test]
async fn generation_error_aborts_body() {
    let failing = stream! {
        yield Ok("partial".to_owned());
        yield Err(anyhow::anyhow!("model went away"));
    };
    let (body, task) = relay(failing);

    let mut frames = body.into_data_stream();
    assert_eq!(frames.next().await.unwrap().unwrap(), "partial");
    assert!(frames.next().await.unwrap().is_err());
    assert_eq!(task.await.unwrap(), RelayState::Aborted);
}

#[tokio::test]
async fn producer_waits_for_the_reader() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let counting = stream! {
        for i in 0..10 {
            counter.fetch_add(1, Ordering::SeqCst);
            yield Ok(format!("t{i} "));
        }
    };

    let (body, task) = relay(counting);
    tokio::time::sleep(Duration::from_millis(100)).await;
    // One token buffered in the channel, one waiting for capacity.
    assert!(pulled.load(Ordering::SeqCst) <= 2);

    let text = body_text(body).await;
    assert!(text.starts_with("t0 t1 "));
    assert_eq!(pulled.load(Ordering::SeqCst), 10);
    assert_eq!(task.await.unwrap(), RelayState::Closed);
}

#[tokio::test]
async fn dropping_body_cancels_generation() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let guard = DropCounter(Arc::clone(&dropped));
    let stalled = stream! {
        let _guard = guard;
        yield Ok("first".to_owned());
        futures_util::future::pending::<()>().await;
    };

    let (body, task) = relay(stalled);
    let mut frames = body.into_data_stream();
    assert_eq!(frames.next().await.unwrap().unwrap(), "first");
    drop(frames);

    let state = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state, RelayState::Cancelled);
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
