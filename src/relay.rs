//! Request relay between the inbound endpoint and the image provider
//!
//! Each call is one linear pass: validate, build the payload, call the
//! provider once, map the reply. Nothing is retried and nothing is shared
//! between calls apart from the read-only provider handle.

use crate::ai::gemini::find_inline_image;
use crate::ai::ImageProvider;
use crate::models::GenerationRequest;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Successful relay result: `{ "base64Image": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub base64_image: String,
}

/// Every way a relay call can fail. `Display` is the public error message.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("API key not configured on the server")]
    MissingApiKey,

    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Failed to get response from Gemini")]
    Upstream { status: StatusCode, details: Value },

    #[error("No image found in Gemini response")]
    NoImage { details: Value },

    /// The server could not buffer the body, e.g. it exceeded the size limit.
    #[error("{message}")]
    UnreadableBody { status: StatusCode, message: String },

    /// Network or parse fault. The cause is logged, never returned.
    #[error("Internal server error")]
    Internal(#[source] crate::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::MissingPrompt => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => *status,
            RelayError::NoImage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UnreadableBody { status, .. } => *status,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Provider payload forwarded to the caller for debugging.
    pub fn details(&self) -> Option<&Value> {
        match self {
            RelayError::Upstream { details, .. } | RelayError::NoImage { details } => {
                Some(details)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for GeneratedImage {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Validates inbound requests and relays them to the image provider.
///
/// The provider is only present when an API key was configured at startup.
#[derive(Clone)]
pub struct RelayHandler {
    provider: Option<Arc<dyn ImageProvider>>,
}

impl RelayHandler {
    pub fn new(provider: Option<Arc<dyn ImageProvider>>) -> Self {
        Self { provider }
    }

    pub fn with_provider(provider: Arc<dyn ImageProvider>) -> Self {
        Self::new(Some(provider))
    }

    /// A handler for a server started without an API key.
    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    /// Handles one call given its method and raw JSON body.
    ///
    /// Checks run in order (method, API key, prompt) and the first failure
    /// wins; the provider is called only after all of them pass.
    pub async fn handle(
        &self,
        method: &Method,
        body: &[u8],
    ) -> Result<GeneratedImage, RelayError> {
        if *method != Method::POST {
            debug!("Rejecting {} request", method);
            return Err(RelayError::MethodNotAllowed);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            error!("GEMINI_API_KEY is not configured");
            RelayError::MissingApiKey
        })?;

        let request = parse_request(body);
        let payload = request.to_payload().ok_or(RelayError::MissingPrompt)?;

        info!(
            "Relaying generation request (edit: {}, prompt_len: {})",
            request.edit_image().is_some(),
            request.prompt().map_or(0, str::len)
        );

        let reply = provider.generate_content(&payload).await.map_err(|e| {
            error!("Internal Server Error: {}", e);
            RelayError::Internal(e)
        })?;

        if !reply.status.is_success() {
            error!("Gemini API error (status {}): {}", reply.status, reply.body);
            return Err(RelayError::Upstream {
                status: reply.status,
                details: reply.body,
            });
        }

        match find_inline_image(&reply.body) {
            Some(data) => Ok(GeneratedImage {
                base64_image: data.to_string(),
            }),
            None => {
                warn!("Gemini response carried no inline image");
                Err(RelayError::NoImage {
                    details: reply.body,
                })
            }
        }
    }
}

// Missing or malformed bodies become a request with no prompt.
fn parse_request(body: &[u8]) -> GenerationRequest {
    if body.is_empty() {
        return GenerationRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Unreadable request body: {}", e);
        GenerationRequest::default()
    })
}
