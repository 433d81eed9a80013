//! Retrieved document chunk.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata keys that may hold the chunk text, in lookup order.
const TEXT_KEYS: [&str; 2] = ["text", "page_content"];

/// A document chunk returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier within the index.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Remaining metadata as stored alongside the vector.
    #[serde(default)]
    pub metadata: Value,
}

impl Document {
    /// Build a document from a stored metadata/payload object, pulling
    /// the text out of the first known text key.
    pub fn from_metadata(id: impl Into<String>, score: f32, metadata: Option<Value>) -> Self {
        let mut metadata = metadata.unwrap_or(Value::Null);
        let text = match metadata.as_object_mut() {
            Some(map) => TEXT_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::String(text)) => Some(text),
                    _ => None,
                })
                .unwrap_or_default(),
            None => String::new(),
        };
        Self {
            id: id.into(),
            text,
            score,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use serde_json::json;

    #[test]
    fn text_is_lifted_out_of_metadata() {
        let doc = Document::from_metadata(
            "a",
            0.9,
            Some(json!({"text": "chunk body", "source": "doc.pdf"})),
        );
        assert_eq!(doc.text, "chunk body");
        assert_eq!(doc.metadata, json!({"source": "doc.pdf"}));
    }

    #[test]
    fn page_content_is_accepted() {
        let doc = Document::from_metadata("b", 0.1, Some(json!({"page_content": "x"})));
        assert_eq!(doc.text, "x");
    }

    #[test]
    fn missing_metadata_yields_empty_text() {
        let doc = Document::from_metadata("c", 0.0, None);
        assert!(doc.text.is_empty());
        assert!(doc.metadata.is_null());
    }
}
