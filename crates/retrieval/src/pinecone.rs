//! Pinecone index adapter (REST data plane).

use crate::{Document, Result, VectorStore, error::checked};
use compact_str::CompactString;
use llm::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Pinecone index reached through its data-plane host.
#[derive(Clone)]
pub struct PineconeStore {
    client: Client,
    api_key: String,
    host: String,
    index: CompactString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<Value>,
}

#[derive(Deserialize)]
struct WhoAmI {
    project_name: String,
}

impl PineconeStore {
    /// Create a store for an index whose data-plane host is known.
    ///
    /// A host without a scheme is reached over https.
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        host: &str,
        index: impl Into<CompactString>,
    ) -> Self {
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_owned()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };
        Self {
            client,
            api_key: api_key.into(),
            host,
            index: index.into(),
        }
    }

    /// Resolve the index host from the environment's controller and
    /// create a store for it.
    pub async fn connect(
        client: Client,
        api_key: impl Into<String>,
        environment: &str,
        index: impl Into<CompactString>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let index = index.into();
        let whoami = format!("https://controller.{environment}.pinecone.io/actions/whoami");
        let response = client
            .get(&whoami)
            .header("Api-Key", &api_key)
            .send()
            .await?;
        let project: WhoAmI = checked("pinecone", response).await?.json().await?;
        let host = index_host(&index, &project.project_name, environment);
        tracing::info!("resolved pinecone index {index} at {host}");
        Ok(Self::new(client, api_key, &host, index))
    }

    /// The data-plane base URL.
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Data-plane host of a pod-based index.
pub fn index_host(index: &str, project: &str, environment: &str) -> String {
    format!("{index}-{project}.svc.{environment}.pinecone.io")
}

impl VectorStore for PineconeStore {
    fn name(&self) -> &str {
        &self.index
    }

    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Document>> {
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response: QueryResponse = checked("pinecone", response).await?.json().await?;
        Ok(response
            .matches
            .into_iter()
            .map(|m| Document::from_metadata(m.id, m.score, m.metadata))
            .collect())
    }
}
