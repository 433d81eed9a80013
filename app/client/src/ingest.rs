//! Ingestion backend client.
//!
//! The backend loads, chunks and embeds content into the vector store.
//! Every call is a single request with no retry; failures carry the
//! backend's `error` field when it sent one.

use protocol::{BackendReply, GitRequest, UrlsRequest, YoutubeRequest};
use reqwest::{
    Client, Method, RequestBuilder, Response,
    multipart::{Form, Part},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Multipart field the backend reads uploaded files from.
pub const FILES_FIELD: &str = "files[]";

/// A failed ingestion call.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("nothing to send: {0}")]
    Empty(&'static str),

    #[error("failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Client for the ingestion backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload files as one multipart request, one `files[]` part per
    /// file. Returns the names the backend stored them under.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> Result<Vec<String>, IngestError> {
        if paths.is_empty() {
            return Err(IngestError::Empty("no files selected"));
        }

        let mut form = Form::new();
        for path in paths {
            form = form.part(FILES_FIELD, file_part(path).await?);
        }
        tracing::debug!("uploading {} files", paths.len());

        let response = self.call(Method::POST, "/uploadFile").multipart(form);
        Ok(checked(response.send().await?).await?.json().await?)
    }

    /// Process the uploaded files into the vector store.
    pub async fn process_files(&self) -> Result<String, IngestError> {
        self.reply(self.call(Method::GET, "/process")).await
    }

    /// Crawl and ingest web pages. Blank entries are dropped.
    pub async fn process_urls<I, S>(&self, urls: I) -> Result<String, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.as_ref().trim().to_owned())
            .filter(|url| !url.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(IngestError::Empty("no URLs provided"));
        }

        let body = UrlsRequest { urls };
        self.reply(self.call(Method::POST, "/url").json(&body)).await
    }

    /// Ingest a YouTube video transcript.
    pub async fn process_youtube(&self, url: &str) -> Result<String, IngestError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(IngestError::Empty("no YouTube URL provided"));
        }

        let body = YoutubeRequest {
            urls: url.to_owned(),
        };
        self.reply(self.call(Method::POST, "/youtube").json(&body)).await
    }

    /// Ingest a Git repository.
    pub async fn process_git(&self, url: &str) -> Result<String, IngestError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(IngestError::Empty("no Git URL provided"));
        }

        let body = GitRequest {
            git_url: url.to_owned(),
        };
        self.reply(self.call(Method::POST, "/git").json(&body)).await
    }

    /// Delete everything from the vector store.
    pub async fn delete_context(&self) -> Result<String, IngestError> {
        self.reply(self.call(Method::DELETE, "/delete")).await
    }

    fn call(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// Send and read the `{message}` reply.
    async fn reply(&self, request: RequestBuilder) -> Result<String, IngestError> {
        let response = checked(request.send().await?).await?;
        let reply: BackendReply = response.json().await?;
        if let Some(error) = reply.error {
            return Err(IngestError::Status {
                status: 200,
                message: error,
            });
        }
        Ok(reply.message.unwrap_or_default())
    }
}

async fn file_part(path: &Path) -> Result<Part, IngestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| IngestError::File {
            path: path.to_owned(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Part::bytes(bytes).file_name(name))
}

/// Turn a non-2xx response into [`IngestError::Status`], preferring the
/// backend's `error` field over the raw body.
async fn checked(response: Response) -> Result<Response, IngestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendReply>(&body)
        .ok()
        .and_then(|reply| reply.error)
        .unwrap_or(body);
    Err(IngestError::Status {
        status: status.as_u16(),
        message,
    })
}
