//! Shared gateway state and its construction.

use chain::Chain;
use compact_str::CompactString;
use std::sync::Arc;

pub mod builder;
pub mod serve;

/// Shared state available to all request handlers.
pub struct Gateway<P, R> {
    /// The retrieval chain (immutable after init).
    pub chain: Arc<Chain<P, R>>,
    /// Models a request may select. Empty allows any.
    pub models: Arc<[CompactString]>,
}

impl<P, R> Gateway<P, R> {
    /// Create the state from a chain and a model allow-list.
    pub fn new<M>(chain: Chain<P, R>, models: impl IntoIterator<Item = M>) -> Self
    where
        M: Into<CompactString>,
    {
        Self {
            chain: Arc::new(chain),
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a request may select `model`.
    pub fn allows(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|m| m == model)
    }
}

impl<P, R> Clone for Gateway<P, R> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            models: Arc::clone(&self.models),
        }
    }
}
