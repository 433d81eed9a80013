use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("http error: {0}")]
    Http(#[from] llm::reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// Turn a non-2xx response into [`Error::Status`].
pub(crate) async fn checked(
    service: &'static str,
    response: llm::reqwest::Response,
) -> Result<llm::reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
