//! Streaming chat session against the gateway.

use crate::session::{Action, Phase, State};
use futures_util::StreamExt;
use protocol::{CHAT_PATH, ChatRequest, Message};
use reqwest::Client;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a chat turn did not complete.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("a response is already streaming")]
    Busy,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response stream broke: {0}")]
    Read(#[source] reqwest::Error),
}

/// One conversation with the gateway. One request in flight at a time.
pub struct ChatSession {
    http: Client,
    url: String,
    model: Option<String>,
    state: State,
}

impl ChatSession {
    /// Create an empty session for the gateway at `gateway_url`.
    pub fn new(http: Client, gateway_url: &str, model: Option<&str>) -> Self {
        Self {
            http,
            url: format!("{}{CHAT_PATH}", gateway_url.trim_end_matches('/')),
            model: model.map(str::to_owned),
            state: State::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Conversation so far.
    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    /// Send `prompt` and stream the answer, calling `on_chunk` with every
    /// decoded piece of text.
    pub async fn send(
        &mut self,
        prompt: &str,
        on_chunk: impl FnMut(&str),
    ) -> Result<Phase, ChatError> {
        self.send_with(prompt, CancellationToken::new(), on_chunk).await
    }

    /// Like [`ChatSession::send`], with a caller-held controller.
    ///
    /// Cancelling `controller` aborts the turn: the response is dropped
    /// and the session returns to idle with the partial answer kept.
    pub async fn send_with(
        &mut self,
        prompt: &str,
        controller: CancellationToken,
        mut on_chunk: impl FnMut(&str),
    ) -> Result<Phase, ChatError> {
        if self.state.is_busy() {
            return Err(ChatError::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let request = ChatRequest {
            prompt: prompt.to_owned(),
            messages: self.state.messages.clone(),
            model: self.model.clone(),
        };
        self.state.apply(Action::AddMessage {
            prompt: prompt.to_owned(),
            controller: controller.clone(),
        });

        let response = tokio::select! {
            _ = controller.cancelled() => return Ok(self.abort()),
            response = self.http.post(&self.url).json(&request).send() => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => return Err(self.fail(ChatError::Request(e))),
        };
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.fail(ChatError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let mut body = response.bytes_stream();
        let mut decoder = Utf8Decoder::default();
        loop {
            let next = tokio::select! {
                _ = controller.cancelled() => return Ok(self.abort()),
                next = body.next() => next,
            };
            match next {
                Some(Ok(bytes)) => self.push(&decoder.push(&bytes), &mut on_chunk),
                Some(Err(e)) => return Err(self.fail(ChatError::Read(e))),
                None => break,
            }
        }
        self.push(&decoder.finish(), &mut on_chunk);

        self.state.apply(Action::Done);
        tracing::debug!("answer complete");
        Ok(self.state.phase())
    }

    /// Abort the turn in flight, if any.
    pub fn abort(&mut self) -> Phase {
        self.state.apply(Action::Abort);
        tracing::debug!("answer aborted");
        self.state.phase()
    }

    /// Forget the conversation.
    pub fn reset(&mut self) {
        self.abort();
        self.state = State::default();
    }

    fn push(&mut self, text: &str, on_chunk: &mut impl FnMut(&str)) {
        if text.is_empty() {
            return;
        }
        on_chunk(text);
        self.state.apply(Action::UpdatePromptAnswer(text.to_owned()));
    }

    fn fail(&mut self, error: ChatError) -> ChatError {
        tracing::warn!("answer failed: {error}");
        self.state.apply(Action::Fail(error.to_string()));
        error
    }
}

/// Incremental UTF-8 decoder.
///
/// Holds back an incomplete trailing sequence until the next chunk
/// completes it. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode as much of `bytes` (after any held-back bytes) as possible.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
