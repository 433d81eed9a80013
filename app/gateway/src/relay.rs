//! Token-streaming relay.
//!
//! Bridges a token stream into an HTTP response body through a channel of
//! capacity one: the generation task pulls the next token only after the
//! previous one has been taken by the body. The body ends when the task
//! ends, and dropping the body (client disconnect) cancels the task.

use axum::body::Body;
use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

/// Error item that aborts the response body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("generation failed: {0}")]
    Generation(String),
}

/// Lifecycle of one relayed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Not started yet.
    Idle,
    /// Tokens are flowing.
    Streaming,
    /// Generation finished and the body ended cleanly.
    Closed,
    /// Generation failed and the body was aborted.
    Aborted,
    /// The client went away before generation finished.
    Cancelled,
}

impl RelayState {
    /// Whether the relay has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Aborted | Self::Cancelled)
    }
}

type Item = Result<Bytes, RelayError>;

/// Spawn the generation task for `tokens` and return the response body
/// fed by it, with the task's handle resolving to its terminal state.
pub fn relay<S>(tokens: S) -> (Body, JoinHandle<RelayState>)
where
    S: Stream<Item = anyhow::Result<String>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Item>(1);
    let task = tokio::spawn(generate(tokens, tx));
    let body = Body::from_stream(async_stream::stream! {
        while let Some(item) = rx.recv().await {
            yield item;
        }
    });
    (body, task)
}

async fn generate<S>(tokens: S, tx: mpsc::Sender<Item>) -> RelayState
where
    S: Stream<Item = anyhow::Result<String>>,
{
    futures_util::pin_mut!(tokens);
    let mut state = RelayState::Idle;
    let mut written = 0usize;

    while !state.is_terminal() {
        state = RelayState::Streaming;
        let next = tokio::select! {
            _ = tx.closed() => {
                state = RelayState::Cancelled;
                continue;
            }
            next = tokens.next() => next,
        };

        state = match next {
            None => RelayState::Closed,
            Some(Ok(token)) if token.is_empty() => RelayState::Streaming,
            Some(Ok(token)) => match tx.send(Ok(Bytes::from(token))).await {
                Ok(()) => {
                    written += 1;
                    RelayState::Streaming
                }
                Err(_) => RelayState::Cancelled,
            },
            Some(Err(e)) => {
                tracing::error!("generation failed after {written} tokens: {e:?}");
                let _ = tx.send(Err(RelayError::Generation(e.to_string()))).await;
                RelayState::Aborted
            }
        };
    }

    tracing::debug!("relay {state:?} after {written} tokens");
    state
}
