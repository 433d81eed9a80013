//! Scripted LLM provider for tests and offline runs.
//!
//! Replays a fixed token sequence on `stream`, optionally followed by an
//! error or by a stall that never completes. Every request is recorded
//! so callers can assert on the prompts that reached the model.

use crate::{Choice, Delta, LLM, Request, Response, StreamChunk};
use anyhow::{Result, anyhow};
use async_stream::try_stream;
use futures_core::Stream;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// What happens after the scripted tokens run out.
#[derive(Clone, Debug, Default)]
enum Ending {
    #[default]
    Complete,
    Fail(String),
    Stall,
}

/// A provider that replays scripted tokens.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    tokens: Arc<Vec<String>>,
    reply: Option<String>,
    ending: Ending,
    requests: Arc<Mutex<Vec<Request>>>,
    dropped: Arc<AtomicBool>,
}

impl ScriptedProvider {
    /// Create a provider that streams the given tokens, then completes.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: Arc::new(tokens.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Fail with the given message after the tokens are streamed.
    pub fn fail_with(mut self, message: impl Into<String>) -> Self {
        self.ending = Ending::Fail(message.into());
        self
    }

    /// Never finish after the tokens are streamed.
    pub fn stall(mut self) -> Self {
        self.ending = Ending::Stall;
        self
    }

    /// Set the complete reply returned by non-streaming `send`.
    ///
    /// Defaults to the concatenated tokens.
    pub fn reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Whether a stream returned by this provider was dropped.
    pub fn stream_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl LLM for ScriptedProvider {
    async fn send(&self, request: &Request) -> Result<Response> {
        self.requests.lock().push(request.clone());
        let content = self.reply.clone().unwrap_or_else(|| self.tokens.concat());
        Ok(Response {
            choices: vec![Choice {
                message: Some(Delta {
                    content: Some(content),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn stream(&self, request: Request) -> impl Stream<Item = Result<StreamChunk>> + Send {
        self.requests.lock().push(request);
        let tokens = Arc::clone(&self.tokens);
        let ending = self.ending.clone();
        let guard = DropFlag(Arc::clone(&self.dropped));

        try_stream! {
            let _guard = guard;
            for token in tokens.iter() {
                yield StreamChunk::token(token.as_str());
            }
            match ending {
                Ending::Complete => {}
                Ending::Fail(message) => Err::<(), _>(anyhow!(message))?,
                Ending::Stall => futures_util::future::pending::<()>().await,
            }
        }
    }
}

/// Sets the flag when the owning stream is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
