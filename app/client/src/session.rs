//! Conversation reducer.
//!
//! All session state changes go through [`reduce`]. The controller is
//! the cancellation handle of the in-flight request; aborting cancels
//! it, which drops the response and closes the connection.

use protocol::{Message, Role};
use tokio_util::sync::CancellationToken;

/// State of one conversation.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
    /// Request sent, no token received yet.
    pub assistant_thinking: bool,
    /// Tokens are arriving.
    pub is_writing: bool,
    /// Cancellation handle of the in-flight request.
    pub controller: Option<CancellationToken>,
    /// Why the last response failed.
    pub error: Option<String>,
    completed: bool,
}

/// Something that happened to the conversation.
#[derive(Debug, Clone)]
pub enum Action {
    /// The user sent a prompt; a request is starting.
    AddMessage {
        prompt: String,
        controller: CancellationToken,
    },
    /// A decoded chunk of the answer arrived.
    UpdatePromptAnswer(String),
    /// The user cancelled the request.
    Abort,
    /// The answer finished.
    Done,
    /// Reading the answer failed.
    Fail(String),
}

/// Where the conversation is, derived from [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// Waiting for the first token.
    Thinking,
    /// Tokens are arriving.
    Writing,
    /// The last answer completed.
    Done,
    /// The last answer broke off.
    Failed,
}

/// Apply `action` to `state`.
pub fn reduce(mut state: State, action: Action) -> State {
    state.apply(action);
    state
}

impl State {
    /// Apply `action` in place.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AddMessage { prompt, controller } => {
                self.messages.push(Message::human(prompt));
                self.messages.push(Message::ai(""));
                self.assistant_thinking = true;
                self.is_writing = false;
                self.controller = Some(controller);
                self.error = None;
                self.completed = false;
            }
            Action::UpdatePromptAnswer(chunk) => {
                let Some(last) = self.messages.last_mut() else {
                    return;
                };
                last.text.push_str(&chunk);
                self.is_writing = true;
                self.assistant_thinking = false;
            }
            Action::Abort => {
                if let Some(controller) = self.controller.take() {
                    controller.cancel();
                }
                self.settle();
            }
            Action::Done => {
                self.controller = None;
                self.settle();
                self.completed = true;
            }
            Action::Fail(reason) => {
                self.controller = None;
                self.settle();
                self.error = Some(reason);
            }
        }
    }

    /// The phase this state is in.
    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            Phase::Failed
        } else if self.assistant_thinking {
            Phase::Thinking
        } else if self.is_writing {
            Phase::Writing
        } else if self.completed {
            Phase::Done
        } else {
            Phase::Idle
        }
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.assistant_thinking || self.is_writing
    }

    /// The answer being written or last written, if any.
    pub fn last_answer(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.name == Role::Ai)
            .map(|m| m.text.as_str())
    }

    fn settle(&mut self) {
        self.assistant_thinking = false;
        self.is_writing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: State, prompt: &str) -> State {
        reduce(
            state,
            Action::AddMessage {
                prompt: prompt.into(),
                controller: CancellationToken::new(),
            },
        )
    }

    #[test]
    fn add_message_appends_human_then_empty_ai() {
        let state = add(State::default(), "first");
        let state = reduce(state, Action::UpdatePromptAnswer("answer".into()));
        let state = reduce(state, Action::Done);
        let before = state.messages.clone();

        let state = add(state, "second");
        assert_eq!(state.messages.len(), before.len() + 2);
        assert_eq!(&state.messages[..before.len()], &before[..]);
        assert_eq!(state.messages[2], Message::human("second"));
        assert_eq!(state.messages[3], Message::ai(""));
        assert_eq!(state.phase(), Phase::Thinking);
        assert!(state.controller.is_some());
    }

    #[test]
    fn chunks_concatenate() {
        let chunks = ["The", " quick", " fox"];
        let mut piecewise = add(State::default(), "q");
        for chunk in chunks {
            piecewise.apply(Action::UpdatePromptAnswer(chunk.into()));
        }
        let whole = reduce(
            add(State::default(), "q"),
            Action::UpdatePromptAnswer(chunks.concat()),
        );
        assert_eq!(piecewise.messages, whole.messages);
        assert_eq!(piecewise.last_answer(), Some("The quick fox"));
        assert_eq!(piecewise.phase(), Phase::Writing);
    }

    #[test]
    fn update_on_empty_conversation_is_noop() {
        let state = reduce(State::default(), Action::UpdatePromptAnswer("x".into()));
        assert!(state.messages.is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn abort_cancels_controller() {
        let token = CancellationToken::new();
        let state = reduce(
            State::default(),
            Action::AddMessage {
                prompt: "q".into(),
                controller: token.clone(),
            },
        );
        let state = reduce(state, Action::Abort);
        assert!(token.is_cancelled());
        assert!(state.controller.is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn done_does_not_cancel() {
        let token = CancellationToken::new();
        let state = reduce(
            State::default(),
            Action::AddMessage {
                prompt: "q".into(),
                controller: token.clone(),
            },
        );
        let state = reduce(state, Action::Done);
        assert!(!token.is_cancelled());
        assert_eq!(state.phase(), Phase::Done);
    }

    #[test]
    fn abort_and_done_without_controller_are_idempotent() {
        let state = reduce(State::default(), Action::Abort);
        let state = reduce(state, Action::Done);
        let state = reduce(state, Action::Done);
        let state = reduce(state, Action::Abort);
        assert!(state.controller.is_none());
        assert!(!state.is_busy());
    }

    #[test]
    fn fail_keeps_partial_text() {
        let state = add(State::default(), "q");
        let state = reduce(state, Action::UpdatePromptAnswer("par".into()));
        let state = reduce(state, Action::Fail("connection reset".into()));
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.last_answer(), Some("par"));
        assert_eq!(state.error.as_deref(), Some("connection reset"));

        // The next prompt clears the failure.
        let state = add(state, "again");
        assert!(state.error.is_none());
        assert_eq!(state.phase(), Phase::Thinking);
    }
}
