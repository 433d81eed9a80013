//! Interactive chat REPL with streaming output and persistent history.

use anyhow::Result;
use client::{ChatError, ChatSession, Phase};
use rustyline::error::ReadlineError;
use std::{io::Write, path::PathBuf};
use tokio_util::sync::CancellationToken;

/// Line that starts a fresh conversation.
const RESET: &str = "/reset";

/// Ctrl+C presses at the prompt. A second press in a row exits.
#[derive(Debug, Default)]
pub struct PromptInterrupts {
    armed: bool,
}

impl PromptInterrupts {
    /// Record a press; returns whether the REPL should exit.
    pub fn press(&mut self) -> bool {
        let exit = self.armed;
        self.armed = true;
        exit
    }

    /// Any other input disarms the exit.
    pub fn clear(&mut self) {
        self.armed = false;
    }
}

/// Interactive chat REPL over a gateway session.
pub struct ChatRepl {
    session: ChatSession,
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new REPL over the given session.
    pub fn new(session: ChatSession) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = history_file_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            session,
            editor,
            history_path,
        })
    }

    /// Run the interactive REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        println!(
            "ragchat (Ctrl+D or Ctrl+C twice to exit, Ctrl+C to stop an answer, {RESET} to start over)"
        );
        println!("---");

        let mut interrupts = PromptInterrupts::default();
        loop {
            match self.editor.readline("> ") {
                Ok(line) => {
                    interrupts.clear();
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);
                    if line == RESET {
                        self.session.reset();
                        println!("conversation cleared");
                        continue;
                    }
                    stream_to_terminal(&mut self.session, &line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    if interrupts.press() {
                        break;
                    }
                    println!("(press Ctrl+C again or Ctrl+D to exit)");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        self.save_history();
        Ok(())
    }

    /// Save readline history to disk.
    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Resolve the history file path at `~/.config/ragchat/history`.
fn history_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ragchat").join("history"))
}

/// Send one prompt and print the answer as it streams.
///
/// Ctrl+C aborts the answer; the partial text stays in the conversation.
/// The SIGINT listener only runs while the answer streams. Once tokio has
/// installed it, SIGINT no longer ends the process, so the REPL handles
/// Ctrl+C at the prompt through the line editor instead.
pub async fn stream_to_terminal(session: &mut ChatSession, prompt: &str) -> Option<Phase> {
    let controller = CancellationToken::new();
    let watcher = tokio::spawn({
        let controller = controller.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                controller.cancel();
            }
        }
    });

    let result = session
        .send_with(prompt, controller, |text| {
            print!("{text}");
            std::io::stdout().flush().ok();
        })
        .await;
    watcher.abort();
    println!();

    match result {
        Ok(Phase::Failed) => {
            let error = session.state().error.as_deref().unwrap_or("unknown error");
            eprintln!("Error: {error}");
            Some(Phase::Failed)
        }
        Ok(Phase::Idle) => {
            eprintln!("[stopped]");
            Some(Phase::Idle)
        }
        Ok(phase) => Some(phase),
        Err(ChatError::EmptyPrompt) => None,
        Err(e) => {
            eprintln!("Error: {e}");
            None
        }
    }
}
