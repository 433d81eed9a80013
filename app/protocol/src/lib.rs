//! ragchat wire types shared between gateway and client.
//!
//! Chat messages keep the field names the browser front-end used
//! (`name`, `text`) so existing clients can talk to the gateway.

use serde::{Deserialize, Serialize};

pub use ingest::{BackendReply, GitRequest, UrlsRequest, YoutubeRequest};

pub mod ingest;

/// Path of the streaming chat route.
pub const CHAT_PATH: &str = "/api/chat";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking.
    Human,
    /// The model.
    Ai,
    /// Instructions, never rendered.
    System,
}

/// A conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub name: Role,
    /// Message body. Markdown for `ai`, plain text otherwise.
    pub text: String,
}

impl Message {
    /// A message from the person asking.
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            name: Role::Human,
            text: text.into(),
        }
    }

    /// A message from the model.
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            name: Role::Ai,
            text: text.into(),
        }
    }

    /// A system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            name: Role::System,
            text: text.into(),
        }
    }
}

impl From<&Message> for llm::Message {
    fn from(message: &Message) -> Self {
        match message.name {
            Role::Human => llm::Message::user(&message.text),
            Role::Ai => llm::Message::assistant(&message.text),
            Role::System => llm::Message::system(&message.text),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new question.
    pub prompt: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Model identifier; the gateway default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Prior turns as model messages.
    pub fn history(&self) -> Vec<llm::Message> {
        self.messages.iter().map(Into::into).collect()
    }
}
