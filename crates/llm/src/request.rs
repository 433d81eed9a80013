//! OpenAI-compatible request body.
//!
//! Optional fields use `skip_serializing_if` so they are simply absent
//! when unused.

use crate::{General, Message};
use serde::Serialize;
use serde_json::{Value, json};

/// OpenAI-compatible chat completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The messages to send.
    pub messages: Vec<Message>,
    /// The model identifier.
    pub model: String,
    /// Whether to stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Stream options (e.g. include_usage).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<Value>,
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Request {
    /// Set the messages of the request.
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Enable streaming for the request.
    pub fn stream(mut self, usage: bool) -> Self {
        self.stream = Some(true);
        self.stream_options = if usage {
            Some(json!({ "include_usage": true }))
        } else {
            None
        };
        self
    }
}

impl From<General> for Request {
    fn from(general: General) -> Self {
        Self {
            messages: Vec::new(),
            model: general.model.to_string(),
            stream: None,
            stream_options: None,
            temperature: general.temperature,
        }
    }
}
