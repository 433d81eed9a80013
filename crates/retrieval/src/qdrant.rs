//! Qdrant collection adapter (REST API).

use crate::{Document, Result, VectorStore, error::checked};
use compact_str::CompactString;
use llm::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Qdrant collection.
#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    url: String,
    collection: CompactString,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: Value,
    #[serde(default)]
    score: f32,
    payload: Option<Value>,
}

impl QdrantStore {
    /// Create a store for `collection` on the server at `url`.
    pub fn new(client: Client, url: &str, collection: impl Into<CompactString>) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            collection: collection.into(),
            api_key: None,
        }
    }

    /// Authenticate with an API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The server base URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VectorStore for QdrantStore {
    fn name(&self) -> &str {
        &self.collection
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Document>> {
        let body = SearchRequest {
            vector,
            limit: top_k,
            with_payload: true,
        };
        let mut request = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.url, self.collection
            ))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }
        let response: SearchResponse = checked("qdrant", request.send().await?)
            .await?
            .json()
            .await?;
        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let id = match point.id {
                    Value::String(id) => id,
                    other => other.to_string(),
                };
                Document::from_metadata(id, point.score, point.payload)
            })
            .collect())
    }
}
