//! Chat commands: the interactive REPL and one-shot questions.

use crate::repl::{ChatRepl, stream_to_terminal};
use anyhow::{Result, bail};
use client::{Phase, RagChatClient};

/// Enter the interactive REPL.
pub async fn repl(client: RagChatClient) -> Result<()> {
    let mut repl = ChatRepl::new(client.session())?;
    repl.run().await
}

/// Ask one question and print the streamed answer.
pub async fn ask(client: RagChatClient, prompt: &str) -> Result<()> {
    let mut session = client.session();
    match stream_to_terminal(&mut session, prompt).await {
        Some(Phase::Done) => Ok(()),
        Some(Phase::Idle) => Ok(()),
        _ => bail!("no answer received"),
    }
}
