//! The retrieval chain.

use crate::prompt;
use anyhow::Result;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{FinishReason, General, LLM, Message, Request};
use retrieval::Retrieve;

/// Persona used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly assistant.";

/// Condense, retrieve, answer.
///
/// Cheap to clone; each call to [`Chain::stream`] owns its own clone.
#[derive(Clone)]
pub struct Chain<P, R> {
    provider: P,
    retriever: R,
    general: General,
    system_prompt: String,
}

impl<P: LLM, R: Retrieve> Chain<P, R> {
    /// Create a chain with the default persona.
    pub fn new(provider: P, retriever: R, general: General) -> Self {
        Self {
            provider,
            retriever,
            general,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }

    /// Set the persona prepended to the answering prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// The model used when a call doesn't name one.
    pub fn default_model(&self) -> &str {
        &self.general.model
    }

    /// The provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Rephrase `question` as a standalone question.
    ///
    /// Returns the question unchanged when there is no history.
    pub async fn standalone_question(
        &self,
        question: &str,
        history: &[Message],
        model: &str,
    ) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_owned());
        }

        let request = self
            .request(model)
            .messages(vec![Message::user(prompt::condense_prompt(history, question))]);
        let response = self.provider.send(&request).await?;
        let condensed = response.content().map(str::trim).unwrap_or_default();
        if condensed.is_empty() {
            tracing::warn!("empty standalone question, using the original");
            return Ok(question.to_owned());
        }

        tracing::debug!("standalone question: {condensed}");
        Ok(condensed.to_owned())
    }

    /// Stream the answer to `question` token by token.
    ///
    /// `model` falls back to the configured default. Dropping the stream
    /// drops the in-flight model call.
    pub fn stream(
        &self,
        question: String,
        history: Vec<Message>,
        model: Option<String>,
    ) -> impl Stream<Item = Result<String>> + Send + 'static {
        let this = self.clone();
        let model = model.unwrap_or_else(|| this.general.model.to_string());

        try_stream! {
            let standalone = this.standalone_question(&question, &history, &model).await?;
            let documents = this.retriever.retrieve(&standalone).await?;
            tracing::debug!("answering with {} documents as context", documents.len());

            let messages = prompt::qa_messages(&this.system_prompt, &documents, &history, &standalone);
            let inner = this.provider.stream(this.request(&model).messages(messages));
            futures_util::pin_mut!(inner);

            let mut finish = None;
            while let Some(result) = inner.next().await {
                let chunk = match result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::error!("error in model stream: {e:?}");
                        Err(e)?
                    }
                };
                if let Some(reason) = chunk.reason() {
                    finish = Some(*reason);
                }
                if let Some(token) = chunk.content() {
                    yield token.to_owned();
                }
            }

            match finish {
                Some(FinishReason::Length) => tracing::warn!("answer truncated at the token limit"),
                Some(FinishReason::ContentFilter) => tracing::warn!("answer cut by the content filter"),
                reason => tracing::debug!("answer finished: {reason:?}"),
            }
        }
    }

    fn request(&self, model: &str) -> Request {
        let mut request = Request::from(self.general.clone());
        request.model = model.to_owned();
        request
    }
}
