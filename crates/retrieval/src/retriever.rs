//! Query-to-documents retrieval.

use crate::{Document, Error, Result, VectorStore};
use llm::Embedder;
use std::future::Future;

/// Number of documents fetched per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Fetch the documents relevant to a natural-language query.
pub trait Retrieve: Clone + Send + Sync + 'static {
    /// Retrieve documents for `query`, best first.
    fn retrieve(&self, query: &str) -> impl Future<Output = Result<Vec<Document>>> + Send;
}

/// Embeds the query, then searches the vector store.
#[derive(Clone)]
pub struct Retriever<E, S> {
    embedder: E,
    store: S,
    top_k: usize,
}

impl<E: Embedder, S: VectorStore> Retriever<E, S> {
    /// Create a retriever returning [`DEFAULT_TOP_K`] documents.
    pub fn new(embedder: E, store: S) -> Self {
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many documents a query returns.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<E: Embedder, S: VectorStore> Retrieve for Retriever<E, S> {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let documents = self.store.search(&vector, self.top_k).await?;
        tracing::debug!(
            "retrieved {} documents from {}",
            documents.len(),
            self.store.name()
        );
        Ok(documents)
    }
}
