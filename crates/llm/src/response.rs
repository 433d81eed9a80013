//! Chat response abstractions

use crate::Role;
use serde::Deserialize;

/// Common metadata shared between streaming and non-streaming completions
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompletionMeta {
    /// A unique identifier for the chat completion
    #[serde(default)]
    pub id: String,

    /// The object type
    #[serde(default)]
    pub object: String,

    /// Unix timestamp (in seconds) of when the response was created
    #[serde(default)]
    pub created: u64,

    /// The model used for the completion
    #[serde(default)]
    pub model: String,
}

/// Message content in a completion response
///
/// Used for both streaming deltas and non-streaming response messages.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Delta {
    /// The role of the message author
    pub role: Option<Role>,

    /// The content of the message
    pub content: Option<String>,
}

/// A chat completion response from the LLM
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Response {
    /// Completion metadata
    #[serde(flatten)]
    pub meta: CompletionMeta,

    /// The list of completion choices
    pub choices: Vec<Choice>,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

impl Response {
    /// Get the content of the first choice
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta().content.as_deref())
    }
}

/// A completion choice
///
/// Non-streaming responses carry `message`, streaming chunks carry
/// `delta`; both deserialize into the same shape.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Choice {
    /// The index of this choice in the list
    #[serde(default)]
    pub index: u32,

    /// The generated message (non-streaming)
    #[serde(default)]
    pub message: Option<Delta>,

    /// The delta content (streaming)
    #[serde(default)]
    pub delta: Option<Delta>,

    /// The reason the model stopped generating
    pub finish_reason: Option<FinishReason>,
}

impl Choice {
    /// The populated message body, whichever of `message`/`delta` is set.
    pub fn delta(&self) -> &Delta {
        static EMPTY: Delta = Delta {
            role: None,
            content: None,
        };
        self.delta
            .as_ref()
            .or(self.message.as_ref())
            .unwrap_or(&EMPTY)
    }
}

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished naturally
    Stop,

    /// The model hit the max token limit
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    ToolCalls,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens used
    pub total_tokens: u32,
}
