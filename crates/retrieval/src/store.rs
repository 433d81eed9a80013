//! The vector-store capability.

use crate::{Document, Result};
use std::future::Future;

/// Similarity search of an embedded query against a named index.
///
/// Uses RPITIT for async without boxing.
pub trait VectorStore: Clone + Send + Sync + 'static {
    /// The index or collection searched.
    fn name(&self) -> &str;

    /// Return the `top_k` documents closest to `vector`, best first.
    fn search(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> impl Future<Output = Result<Vec<Document>>> + Send;
}
