//! Prompt templates.

use llm::{Message, Role};
use retrieval::Document;

const CONDENSE_PREAMBLE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question.

Chat History:
";

const QA_INSTRUCTIONS: &str = "Use the following pieces of context to answer the users question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.
----------------
";

/// Render prior turns as `Human: ...` / `Assistant: ...` lines.
///
/// System messages are not part of the transcript.
pub fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .filter_map(|message| match message.role {
            Role::User => Some(format!("Human: {}", message.content)),
            Role::Assistant => Some(format!("Assistant: {}", message.content)),
            Role::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The prompt asking the model for a standalone version of `question`.
pub fn condense_prompt(history: &[Message], question: &str) -> String {
    format!(
        "{CONDENSE_PREAMBLE}{}\nFollow Up Input: {question}\nStandalone question:",
        format_history(history)
    )
}

/// Join retrieved chunks into one context block.
pub fn format_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Messages for the answering call: system persona with the retrieved
/// context, the prior turns, then the question.
pub fn qa_messages(
    system: &str,
    documents: &[Document],
    history: &[Message],
    question: &str,
) -> Vec<Message> {
    let mut system_prompt = String::new();
    if !system.is_empty() {
        system_prompt.push_str(system);
        system_prompt.push_str("\n\n");
    }
    system_prompt.push_str(QA_INSTRUCTIONS);
    system_prompt.push_str(&format_context(documents));

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(
        history
            .iter()
            .filter(|message| message.role != Role::System)
            .cloned(),
    );
    messages.push(Message::user(question));
    messages
}
