//! ragchat client library: the conversation reducer, a streaming chat
//! session against the gateway, the ingestion backend client, file
//! selection helpers and the message renderer. Used by ragchat-cli.

use compact_str::CompactString;

pub use chat::{ChatError, ChatSession, Utf8Decoder};
pub use ingest::{BackendClient, IngestError};
pub use protocol::{Message, Role};
pub use render::{escape_html, render, render_markdown};
pub use session::{Action, Phase, State, reduce};
pub use upload::{ALLOWED_EXTENSIONS, FileSelection, UrlEntries};

pub mod chat;
pub mod ingest;
pub mod render;
pub mod session;
pub mod upload;

/// Client configuration: where the gateway and the ingestion backend live.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL.
    pub gateway_url: CompactString,
    /// Ingestion backend base URL.
    pub backend_url: CompactString,
    /// Model requested per chat; the gateway default when unset.
    pub model: Option<CompactString>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: CompactString::from("http://127.0.0.1:3000"),
            backend_url: CompactString::from("http://127.0.0.1:5000"),
            model: None,
        }
    }
}

/// HTTP client for a ragchat deployment.
///
/// Holds configuration and a shared connection pool. Sessions and the
/// backend client created from it share the pool.
pub struct RagChatClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl RagChatClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Access the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set the gateway URL.
    pub fn gateway_url(mut self, url: impl Into<CompactString>) -> Self {
        self.config.gateway_url = url.into();
        self
    }

    /// Set the ingestion backend URL.
    pub fn backend_url(mut self, url: impl Into<CompactString>) -> Self {
        self.config.backend_url = url.into();
        self
    }

    /// Set the model requested per chat.
    pub fn model(mut self, model: impl Into<CompactString>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    /// Start an empty chat session.
    pub fn session(&self) -> ChatSession {
        ChatSession::new(
            self.http.clone(),
            &self.config.gateway_url,
            self.config.model.as_deref(),
        )
    }

    /// A client for the ingestion backend.
    pub fn backend(&self) -> BackendClient {
        BackendClient::new(self.http.clone(), &self.config.backend_url)
    }
}
