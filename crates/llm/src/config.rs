//! Configuration for a chat

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Chat configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct General {
    /// The model to use
    pub model: CompactString,

    /// Sampling temperature, `None` leaves the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl General {
    /// Create a new configuration
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
        }
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: Some(0.0),
        }
    }
}
