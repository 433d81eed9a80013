//! Embedding trait for converting text to vector representations.
//!
//! Used by the retriever to embed a query before similarity search.

use crate::{Client, HttpProvider, http::join_url};
use anyhow::{Result, anyhow};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Converts text into a dense vector embedding.
///
/// Implementations may call external APIs (OpenAI, local models, etc.).
/// Uses RPITIT for async without boxing.
pub trait Embedder: Clone + Send + Sync + 'static {
    /// Embed the given text into a dense float vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    http: HttpProvider,
    model: CompactString,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create an embedder for the given base URL and model.
    pub fn new(
        client: Client,
        key: &str,
        base_url: &str,
        model: impl Into<CompactString>,
    ) -> Result<Self> {
        let http = HttpProvider::bearer(client, key, &join_url(base_url, "embeddings"))?;
        Ok(Self {
            http,
            model: model.into(),
        })
    }

    /// The embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The embeddings endpoint.
    pub fn endpoint(&self) -> &str {
        self.http.endpoint()
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = EmbeddingRequest {
            input: text,
            model: &self.model,
        };
        let response: EmbeddingResponse = self.http.request(&body).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("embedding response contained no data"))
    }
}
