//! Similarity search over pre-embedded document chunks.
//!
//! One [`VectorStore`] capability ("search an embedded query against a
//! named index") with interchangeable adapters: Pinecone, Qdrant and an
//! in-process store. [`VectorBackend`] selects one at startup and
//! [`Retriever`] pairs it with an [`llm::Embedder`].

pub use backend::VectorBackend;
pub use document::Document;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use pinecone::{PineconeStore, index_host};
pub use qdrant::QdrantStore;
pub use retriever::{DEFAULT_TOP_K, Retrieve, Retriever};
pub use store::VectorStore;

mod backend;
mod document;
mod error;
mod memory;
mod pinecone;
mod qdrant;
mod retriever;
mod store;
