//! Conversational retrieval chain.
//!
//! A [`Chain`] turns a question plus prior turns into a stream of
//! answer tokens: it condenses the question into a standalone one when
//! history exists, retrieves context for it, assembles the prompt and
//! streams the model's answer. Only the answer is streamed; the
//! condensing call is a plain request.

pub use chain::{Chain, DEFAULT_SYSTEM_PROMPT};
pub use prompt::{condense_prompt, format_context, format_history, qa_messages};

mod chain;
mod prompt;
