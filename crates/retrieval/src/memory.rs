//! In-process vector store.
//!
//! Brute-force cosine similarity over a shared list of entries. Meant
//! for local runs and tests; nothing is persisted.

use crate::{Document, Error, Result, VectorStore};
use compact_str::CompactString;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
struct Entry {
    id: String,
    text: String,
    metadata: Value,
    vector: Vec<f32>,
}

/// An in-memory index. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    name: CompactString,
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl MemoryStore {
    /// Create an empty store with the given index name.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::default(),
        }
    }

    /// Add a chunk. All vectors in one store share a dimension.
    pub fn insert(
        &self,
        id: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
    ) -> Result<()> {
        self.insert_with_metadata(id, text, vector, Value::Null)
    }

    /// Add a chunk carrying extra metadata.
    pub fn insert_with_metadata(
        &self,
        id: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
        metadata: Value,
    ) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(first) = entries.first()
            && first.vector.len() != vector.len()
        {
            return Err(Error::InvalidDimension {
                expected: first.vector.len(),
                actual: vector.len(),
            });
        }
        entries.push(Entry {
            id: id.into(),
            text: text.into(),
            metadata,
            vector,
        });
        Ok(())
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every chunk.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl VectorStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Document>> {
        let entries = self.entries.read();
        if let Some(first) = entries.first()
            && first.vector.len() != vector.len()
        {
            return Err(Error::InvalidDimension {
                expected: first.vector.len(),
                actual: vector.len(),
            });
        }

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(vector, &entry.vector), entry))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| Document {
                id: entry.id.clone(),
                text: entry.text.clone(),
                score,
                metadata: entry.metadata.clone(),
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 for zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
