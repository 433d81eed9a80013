//! Shared HTTP transport for OpenAI-compatible providers.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-configured headers,
//! endpoint URL and a retry budget. Provides `send()` for non-streaming
//! and `stream_sse()` for Server-Sent Events streaming.

use crate::{LLM, Request, Response, StreamChunk};
use anyhow::{Result, anyhow};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client, Method, StatusCode,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

/// Default number of retries for a failed call.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Shared HTTP transport for OpenAI-compatible providers.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// and the target endpoint URL.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
    max_retries: u32,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = json_headers();
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a provider without authentication (e.g. a local server).
    pub fn no_auth(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            headers: json_headers(),
            endpoint: endpoint.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a provider with a custom header for authentication.
    ///
    /// Used by services that don't use Bearer tokens (e.g. Pinecone
    /// uses `Api-Key`).
    pub fn custom_header(
        client: Client,
        header_name: &str,
        header_value: &str,
        endpoint: &str,
    ) -> Result<Self> {
        let mut headers = json_headers();
        headers.insert(
            header_name.parse::<HeaderName>()?,
            header_value.parse::<HeaderValue>()?,
        );
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a chat completions provider for an OpenAI-compatible base URL.
    pub fn chat(client: Client, key: &str, base_url: &str) -> Result<Self> {
        Self::bearer(client, key, &join_url(base_url, "chat/completions"))
    }

    /// Set the number of retries after a failed call.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// POST a JSON body and deserialize the JSON response.
    pub async fn request<T: DeserializeOwned>(&self, body: &impl Serialize) -> Result<T> {
        let body = serde_json::to_vec(body)?;
        tracing::trace!("request: {}", String::from_utf8_lossy(&body));
        let text = self.post(body).await?.text().await?;
        tracing::trace!("response: {text}");
        serde_json::from_str(&text).map_err(Into::into)
    }

    /// Send a non-streaming chat request.
    pub async fn send(&self, body: &impl Serialize) -> Result<Response> {
        self.request(body).await
    }

    /// Stream an SSE response (OpenAI-compatible format).
    ///
    /// Buffers bytes into lines, parses `data:` lines, stops at the
    /// `[DONE]` sentinel, and deserializes each chunk as [`StreamChunk`].
    /// Retries only apply before the response starts.
    pub fn stream_sse<B: Serialize>(
        &self,
        body: &B,
    ) -> impl Stream<Item = Result<StreamChunk>> + Send + use<B> {
        let body = serde_json::to_vec(body);
        let this = self.clone();

        try_stream! {
            let body = body?;
            tracing::trace!("request: {}", String::from_utf8_lossy(&body));
            let response = this.post(body).await?;
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut chunks = 0usize;

            'read: while let Some(next) = stream.next().await {
                let bytes = next?;
                tracing::trace!("chunk: {}", String::from_utf8_lossy(&bytes));
                buffer.extend_from_slice(&bytes);

                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    match parse_line(&line) {
                        Line::Chunk(chunk) => {
                            chunks += 1;
                            yield chunk;
                        }
                        Line::Done => break 'read,
                        Line::Skip => {}
                    }
                }
            }

            if let Line::Chunk(chunk) = parse_line(&buffer) {
                chunks += 1;
                yield chunk;
            }
            tracing::debug!("stream closed after {chunks} chunks");
        }
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// POST the body, retrying transport failures, 5xx and 429 answers up
    /// to the retry budget. Other error statuses fail immediately.
    async fn post(&self, body: Vec<u8>) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .request(Method::POST, &self.endpoint)
                .headers(self.headers.clone())
                .body(body.clone())
                .send()
                .await;

            let (error, retry) = match sent {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    (anyhow!("provider returned {status}: {text}"), retryable(status))
                }
                Err(e) => (e.into(), true),
            };

            if !retry || attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;
            tracing::warn!("request to {} failed: {error}, retry {attempt}", self.endpoint);
        }
    }
}

impl LLM for HttpProvider {
    async fn send(&self, request: &Request) -> Result<Response> {
        HttpProvider::send(self, request).await
    }

    fn stream(&self, request: Request) -> impl Stream<Item = Result<StreamChunk>> + Send {
        self.stream_sse(&request.stream(false))
    }
}

/// Join a base URL and a path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Whether a failed status is worth another attempt.
fn retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

enum Line {
    Chunk(StreamChunk),
    Done,
    Skip,
}

fn parse_line(line: &[u8]) -> Line {
    let line = String::from_utf8_lossy(line);
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Line::Skip;
    };
    let data = data.trim();
    if data.is_empty() {
        return Line::Skip;
    }
    if data == "[DONE]" {
        return Line::Done;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => Line::Chunk(chunk),
        Err(e) => {
            tracing::warn!("failed to parse chunk: {e}, data: {data}");
            Line::Skip
        }
    }
}
