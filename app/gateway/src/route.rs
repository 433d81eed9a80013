//! HTTP routes.

use crate::{gateway::Gateway, relay::relay};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use llm::LLM;
use protocol::{CHAT_PATH, ChatRequest};
use retrieval::Retrieve;
use thiserror::Error;

/// Content type of the chat response. The body is raw token bytes.
pub const EVENT_STREAM: &str = "text/event-stream";

/// A rejected chat request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("model `{0}` is not allowed")]
    ModelNotAllowed(String),

    #[error("malformed request: {0}")]
    Malformed(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyPrompt | Self::ModelNotAllowed(_) => StatusCode::BAD_REQUEST,
            Self::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

/// Build the axum router with `/api/chat` and `/health`.
pub fn router<P: LLM, R: Retrieve>(gateway: Gateway<P, R>) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat::<P, R>))
        .route("/health", get(health))
        .with_state(gateway)
}

async fn health() -> &'static str {
    "ok"
}

/// Validate the request, start generation and stream its tokens back.
async fn chat<P: LLM, R: Retrieve>(
    State(gateway): State<Gateway<P, R>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    if request.prompt.trim().is_empty() {
        return Err(ApiError::EmptyPrompt);
    }

    let model = match request.model.as_deref() {
        None | Some("") => None,
        Some(model) if gateway.allows(model) => Some(model.to_owned()),
        Some(model) => return Err(ApiError::ModelNotAllowed(model.to_owned())),
    };
    tracing::debug!(
        "chat request: {} prior messages, model {}",
        request.messages.len(),
        model.as_deref().unwrap_or(gateway.chain.default_model())
    );

    let history = request.history();
    let tokens = gateway.chain.stream(request.prompt, history, model);
    let (body, _task) = relay(tokens);

    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(EVENT_STREAM),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}
