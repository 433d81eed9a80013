//! Chat model interface types and traits.
//!
//! This crate provides the shared types used by the chain and the
//! gateway: `Message`, `Response`, `StreamChunk`, `General`, the `LLM`
//! and `Embedder` traits, and `HttpProvider` for OpenAI-compatible HTTP
//! transport. `ScriptedProvider` replays fixed tokens for tests and
//! local runs.

pub use config::General;
pub use embedder::{Embedder, OpenAiEmbedder};
pub use http::{DEFAULT_MAX_RETRIES, HttpProvider};
pub use message::{Message, Role};
pub use provider::LLM;
pub use request::Request;
pub use reqwest::{self, Client};
pub use response::{Choice, CompletionMeta, Delta, FinishReason, Response, Usage};
pub use scripted::ScriptedProvider;
pub use stream::StreamChunk;

mod config;
mod embedder;
mod http;
mod message;
mod provider;
mod request;
mod response;
mod scripted;
mod stream;
