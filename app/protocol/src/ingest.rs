//! Payloads of the ingestion backend.

use serde::{Deserialize, Serialize};

/// Body of `POST /url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlsRequest {
    /// Pages to crawl.
    pub urls: Vec<String>,
}

/// Body of `POST /youtube`.
///
/// The backend expects a single URL under the plural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeRequest {
    /// Video URL.
    pub urls: String,
}

/// Body of `POST /git`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRequest {
    /// Repository URL.
    pub git_url: String,
}

/// `{message}` or `{error}` reply of the processing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReply {
    /// Success description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
