//! Gateway configuration loaded from TOML.

use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config directory name under platform config dir.
pub const CONFIG_DIR: &str = "ragchat";
/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "gateway.toml";

/// Resolve the global configuration directory (`~/.config/ragchat/` on unix).
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR))
}

/// Errors found while loading or checking the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("default model `{0}` is not in `llm.models`")]
    DefaultModelNotAllowed(CompactString),

    #[error("temperature {0} is outside 0.0..=2.0")]
    Temperature(f32),

    #[error("`retrieval.top_k` must be at least 1")]
    TopK,
}

/// Top-level gateway configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat model configuration.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Query embedding configuration.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Prompt settings.
    #[serde(default)]
    pub prompt: PromptConfig,
    /// Retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// The vector store queried for context.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key (supports `${ENV_VAR}` expansion).
    pub api_key: String,
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    /// Model used when a request doesn't name one.
    pub default_model: CompactString,
    /// Models a request may select. Empty allows any.
    pub models: Vec<CompactString>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Retries after a failed model call.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_owned(),
            default_model: "gpt-3.5-turbo".into(),
            models: vec!["gpt-3.5-turbo".into(), "gpt-4".into()],
            temperature: 0.0,
            max_retries: llm::DEFAULT_MAX_RETRIES,
        }
    }
}

impl LlmConfig {
    /// Whether a request may select `model`.
    pub fn allows(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|m| m == model)
    }
}

/// Query embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model.
    pub model: CompactString,
    /// API key, `llm.api_key` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL, `llm.base_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".into(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Persona prepended to the answering prompt.
    pub system: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: chain::DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Documents fetched per question.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: retrieval::DEFAULT_TOP_K,
        }
    }
}

/// Vector store selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum VectorStoreConfig {
    /// A Pinecone index.
    Pinecone {
        /// API key.
        api_key: String,
        /// Project environment, used to resolve the index host.
        #[serde(default)]
        environment: String,
        /// Index name.
        index: String,
        /// Data-plane host; resolved through the controller when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host: Option<String>,
    },
    /// A Qdrant collection.
    Qdrant {
        /// Server URL.
        url: String,
        /// Collection name.
        collection: String,
        /// API key.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
    /// An in-process store seeded at startup.
    Memory {
        /// Index name.
        #[serde(default = "default_memory_index")]
        index: String,
        /// Chunks embedded and stored at startup.
        #[serde(default)]
        documents: Vec<String>,
    },
}

fn default_memory_index() -> String {
    "default".to_owned()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self::Memory {
            index: default_memory_index(),
            documents: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML string into a `GatewayConfig`, expanding environment
    /// variables first.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        Ok(toml::from_str(&expanded)?)
    }

    /// Load configuration from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// The configuration written by `init-config`: OpenAI plus a Pinecone
    /// index, credentials taken from the environment.
    pub fn scaffold() -> Self {
        Self {
            llm: LlmConfig {
                api_key: "${OPENAI_API_KEY}".to_owned(),
                ..Default::default()
            },
            vector_store: VectorStoreConfig::Pinecone {
                api_key: "${PINECONE_API_KEY}".to_owned(),
                environment: "${PINECONE_ENV}".to_owned(),
                index: "${PINECONE_INDEX}".to_owned(),
                host: None,
            },
            ..Default::default()
        }
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Embedding API key, falling back to the chat model's.
    pub fn embedding_api_key(&self) -> &str {
        self.embedding.api_key.as_deref().unwrap_or(&self.llm.api_key)
    }

    /// Embedding base URL, falling back to the chat model's.
    pub fn embedding_base_url(&self) -> &str {
        self.embedding
            .base_url
            .as_deref()
            .unwrap_or(&self.llm.base_url)
    }

    /// Check that every setting needed at runtime is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("llm.api_key"));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("llm.base_url"));
        }
        if self.llm.default_model.is_empty() {
            return Err(ConfigError::Missing("llm.default_model"));
        }
        if !self.llm.allows(&self.llm.default_model) {
            return Err(ConfigError::DefaultModelNotAllowed(
                self.llm.default_model.clone(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Temperature(self.llm.temperature));
        }
        if self.embedding.model.is_empty() {
            return Err(ConfigError::Missing("embedding.model"));
        }
        if self.embedding_api_key().trim().is_empty() {
            return Err(ConfigError::Missing("embedding.api_key"));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::TopK);
        }

        match &self.vector_store {
            VectorStoreConfig::Pinecone {
                api_key,
                environment,
                index,
                host,
            } => {
                if api_key.trim().is_empty() {
                    return Err(ConfigError::Missing("vector_store.api_key"));
                }
                if index.trim().is_empty() {
                    return Err(ConfigError::Missing("vector_store.index"));
                }
                if host.is_none() && environment.trim().is_empty() {
                    return Err(ConfigError::Missing("vector_store.environment"));
                }
            }
            VectorStoreConfig::Qdrant {
                url, collection, ..
            } => {
                if url.trim().is_empty() {
                    return Err(ConfigError::Missing("vector_store.url"));
                }
                if collection.trim().is_empty() {
                    return Err(ConfigError::Missing("vector_store.collection"));
                }
            }
            VectorStoreConfig::Memory { .. } => {}
        }

        Ok(())
    }
}

/// Write a default `gateway.toml` into `config_dir`, creating the
/// directory. Returns the path of the written file.
pub fn scaffold_config_dir(config_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;

    let gateway_toml = config_dir.join(CONFIG_FILE);
    let contents = toml::to_string_pretty(&GatewayConfig::scaffold())
        .context("failed to serialize default config")?;
    std::fs::write(&gateway_toml, contents)
        .with_context(|| format!("failed to write {}", gateway_toml.display()))?;

    Ok(gateway_toml)
}
