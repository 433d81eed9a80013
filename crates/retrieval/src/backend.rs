//! Vector-store enum for runtime selection.
//!
//! Each variant wraps a concrete adapter and `impl VectorStore`
//! delegates to it, so the chain is written once against the trait and
//! the backend is picked by configuration.

use crate::{Document, MemoryStore, PineconeStore, QdrantStore, Result, VectorStore};

/// The configured vector store.
#[derive(Clone)]
pub enum VectorBackend {
    /// Pinecone index.
    Pinecone(PineconeStore),
    /// Qdrant collection.
    Qdrant(QdrantStore),
    /// In-process store.
    Memory(MemoryStore),
}

impl VectorBackend {
    /// Short backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pinecone(_) => "pinecone",
            Self::Qdrant(_) => "qdrant",
            Self::Memory(_) => "memory",
        }
    }
}

impl VectorStore for VectorBackend {
    fn name(&self) -> &str {
        match self {
            Self::Pinecone(s) => s.name(),
            Self::Qdrant(s) => s.name(),
            Self::Memory(s) => s.name(),
        }
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Document>> {
        match self {
            Self::Pinecone(s) => s.search(vector, top_k).await,
            Self::Qdrant(s) => s.search(vector, top_k).await,
            Self::Memory(s) => s.search(vector, top_k).await,
        }
    }
}
