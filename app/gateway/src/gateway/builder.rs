//! Gateway builder: constructs provider, retriever and chain from
//! [`GatewayConfig`].

use crate::{
    GatewayConfig,
    config::VectorStoreConfig,
    gateway::Gateway,
};
use anyhow::{Context, Result};
use chain::Chain;
use llm::{Client, Embedder, General, HttpProvider, OpenAiEmbedder};
use retrieval::{MemoryStore, PineconeStore, QdrantStore, Retriever, VectorBackend};

/// The gateway as assembled from configuration.
pub type ConfiguredGateway = Gateway<HttpProvider, Retriever<OpenAiEmbedder, VectorBackend>>;

/// Validate `config` and build a fully wired gateway.
///
/// Resolves the Pinecone index host through the controller when no host
/// is configured, and embeds the memory store's seed documents.
pub async fn build_gateway(config: &GatewayConfig) -> Result<ConfiguredGateway> {
    config.validate()?;
    let client = Client::new();

    let provider = HttpProvider::chat(client.clone(), &config.llm.api_key, &config.llm.base_url)?
        .with_retries(config.llm.max_retries);
    tracing::info!(
        "chat provider at {} for model {}",
        provider.endpoint(),
        config.llm.default_model
    );

    let embedder = OpenAiEmbedder::new(
        client.clone(),
        config.embedding_api_key(),
        config.embedding_base_url(),
        config.embedding.model.clone(),
    )?;

    let store = build_store(&config.vector_store, client, &embedder).await?;
    tracing::info!("using {} vector store", store.kind());

    let retriever = Retriever::new(embedder, store).top_k(config.retrieval.top_k);
    let general = General::new(config.llm.default_model.clone()).temperature(config.llm.temperature);
    let chain = Chain::new(provider, retriever, general).system_prompt(&config.prompt.system);

    Ok(Gateway::new(chain, config.llm.models.iter().cloned()))
}

async fn build_store(
    config: &VectorStoreConfig,
    client: Client,
    embedder: &impl Embedder,
) -> Result<VectorBackend> {
    let store = match config {
        VectorStoreConfig::Pinecone {
            api_key,
            environment,
            index,
            host: Some(host),
        } if !host.is_empty() => {
            tracing::debug!("pinecone environment {environment} ignored, host is set");
            VectorBackend::Pinecone(PineconeStore::new(client, api_key, host, index.as_str()))
        }
        VectorStoreConfig::Pinecone {
            api_key,
            environment,
            index,
            ..
        } => VectorBackend::Pinecone(
            PineconeStore::connect(client, api_key.as_str(), environment, index.as_str())
                .await
                .with_context(|| format!("failed to resolve pinecone index {index}"))?,
        ),
        VectorStoreConfig::Qdrant {
            url,
            collection,
            api_key,
        } => {
            let store = QdrantStore::new(client, url, collection.as_str());
            VectorBackend::Qdrant(match api_key {
                Some(key) => store.with_api_key(key.as_str()),
                None => store,
            })
        }
        VectorStoreConfig::Memory { index, documents } => {
            let store = MemoryStore::new(index.as_str());
            for (i, text) in documents.iter().enumerate() {
                let vector = embedder
                    .embed(text)
                    .await
                    .with_context(|| format!("failed to embed seed document {i}"))?;
                store.insert(i.to_string(), text.as_str(), vector)?;
            }
            tracing::info!("seeded memory store {index} with {} documents", store.len());
            VectorBackend::Memory(store)
        }
    };
    Ok(store)
}
