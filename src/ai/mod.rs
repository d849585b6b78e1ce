//! Generative image provider integration
//!
//! Provides the provider seam used by the relay plus the Gemini REST client
//! and a scripted mock for tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiHttpClient;
pub use mock::MockImageProvider;

use crate::Result;
use async_trait::async_trait;
use gemini::GenerateContentRequest;
use reqwest::StatusCode;
use serde_json::Value;

/// Raw answer from the provider: its HTTP status and parsed JSON body.
///
/// A non-success status is not an error at this layer; the relay forwards it.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: StatusCode,
    pub body: Value,
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Sends one `generateContent` call. `Err` means the call itself failed
    /// (network, timeout, unreadable success body).
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<ProviderReply>;
}
