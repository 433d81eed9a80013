//! Tests for the retrieval chain.

use ragchat_chain::Chain;
use futures_util::StreamExt;
use llm::{General, Message, Role, ScriptedProvider};
use retrieval::{Document, Error, Retrieve};
use std::sync::{Arc, Mutex};

/// Returns fixed documents and records the queries it saw.
#[derive(Clone, Default)]
struct FixedRetriever {
    documents: Vec<Document>,
    queries: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl FixedRetriever {
    fn with_text(texts: &[&str]) -> Self {
        Self {
            documents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| Document {
                    id: i.to_string(),
                    text: text.to_string(),
                    score: 1.0,
                    metadata: Default::default(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Retrieve for FixedRetriever {
    async fn retrieve(&self, query: &str) -> retrieval::Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.to_owned());
        if self.fail {
            return Err(Error::Embedding("embedder offline".into()));
        }
        Ok(self.documents.clone())
    }
}

fn chain(
    provider: ScriptedProvider,
    retriever: FixedRetriever,
) -> Chain<ScriptedProvider, FixedRetriever> {
    Chain::new(
        provider,
        retriever,
        General::new("gpt-3.5-turbo").temperature(0.0),
    )
}

#[tokio::test]
async fn streams_answer_tokens() {
    let provider = ScriptedProvider::new(["Hi", "!"]);
    let retriever = FixedRetriever::with_text(&["greetings are polite"]);
    let chain = chain(provider.clone(), retriever.clone());

    let tokens: Vec<String> = chain
        .stream("hello".into(), Vec::new(), None)
        .map(|token| token.unwrap())
        .collect()
        .await;
    assert_eq!(tokens, ["Hi", "!"]);

    // No history: no condensing call, the question is used as is.
    assert_eq!(retriever.queries(), ["hello"]);
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.temperature, Some(0.0));
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].content.starts_with("You are a friendly assistant."));
    assert!(request.messages[0].content.ends_with("greetings are polite"));
    assert_eq!(request.messages[1], Message::user("hello"));
}

#[tokio::test]
async fn history_triggers_condensing() {
    let provider = ScriptedProvider::new(["Cargo", " builds"]).reply(" What does cargo do? ");
    let retriever = FixedRetriever::with_text(&["cargo is the build tool"]);
    let chain = chain(provider.clone(), retriever.clone()).system_prompt("You are terse.");

    let history = vec![
        Message::user("what is rust?"),
        Message::assistant("A language."),
    ];
    let answer: Vec<String> = chain
        .stream("and cargo?".into(), history, Some("gpt-4".into()))
        .map(|token| token.unwrap())
        .collect()
        .await;
    assert_eq!(answer.concat(), "Cargo builds");

    assert_eq!(retriever.queries(), ["What does cargo do?"]);
    let requests = provider.requests();
    assert_eq!(requests.len(), 2);

    let condense = &requests[0];
    assert_eq!(condense.model, "gpt-4");
    assert_eq!(condense.messages.len(), 1);
    assert!(
        condense.messages[0]
            .content
            .contains("Human: what is rust?\nAssistant: A language.")
    );
    assert!(condense.messages[0].content.contains("Follow Up Input: and cargo?"));

    let answer = &requests[1];
    assert_eq!(answer.model, "gpt-4");
    assert!(answer.messages[0].content.starts_with("You are terse."));
    assert_eq!(answer.messages[1], Message::user("what is rust?"));
    assert_eq!(answer.messages[2], Message::assistant("A language."));
    assert_eq!(answer.messages[3], Message::user("What does cargo do?"));
}

#[tokio::test]
async fn model_error_ends_the_stream() {
    let provider = ScriptedProvider::new(["partial"]).fail_with("upstream reset");
    let chain = chain(provider, FixedRetriever::default());

    let items: Vec<_> = chain.stream("q".into(), Vec::new(), None).collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "partial");
    let err = items[1].as_ref().unwrap_err();
    assert!(err.to_string().contains("upstream reset"));
}

#[tokio::test]
async fn retrieval_error_yields_no_tokens() {
    let provider = ScriptedProvider::new(["never"]);
    let retriever = FixedRetriever {
        fail: true,
        ..Default::default()
    };
    let chain = chain(provider.clone(), retriever);

    let items: Vec<_> = chain.stream("q".into(), Vec::new(), None).collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap_err().to_string().contains("embedder offline"));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn blank_condensed_question_falls_back() {
    let provider = ScriptedProvider::new(["ok"]).reply("   ");
    let chain = chain(provider, FixedRetriever::default());

    let history = [Message::user("earlier")];
    let question = chain
        .standalone_question("follow up", &history, "gpt-3.5-turbo")
        .await
        .unwrap();
    assert_eq!(question, "follow up");
}

#[tokio::test]
async fn condense_sees_history_verbatim() {
    let provider = ScriptedProvider::new(["ok"]).reply("What is {question} in cargo templates?");
    let chain = chain(provider.clone(), FixedRetriever::default());

    let history = vec![
        Message::user("what does {question} mean in templates?"),
        Message::assistant("A {chat_history} placeholder."),
    ];
    let _: Vec<_> = chain
        .stream("and cargo?".into(), history, None)
        .collect()
        .await;

    let condense = &provider.requests()[0].messages[0].content;
    assert!(condense.contains("Human: what does {question} mean in templates?\n"));
    assert!(condense.contains("Assistant: A {chat_history} placeholder.\n"));
    assert_eq!(condense.matches("and cargo?").count(), 1);
}
