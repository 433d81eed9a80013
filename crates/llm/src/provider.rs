//! Provider abstraction for chat models

use crate::{Request, Response, StreamChunk};
use anyhow::Result;
use futures_core::Stream;
use std::future::Future;

/// A trait for LLM providers
///
/// Uses RPITIT for async without boxing. Providers are cheap to clone
/// and shared across requests.
pub trait LLM: Clone + Send + Sync + 'static {
    /// Send a request and wait for the complete response
    fn send(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;

    /// Send a request and stream the response chunk by chunk
    ///
    /// Dropping the stream abandons the underlying call.
    fn stream(&self, request: Request) -> impl Stream<Item = Result<StreamChunk>> + Send;
}
