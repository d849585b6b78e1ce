use super::types::GenerateContentRequest;
use crate::ai::{ImageProvider, ProviderReply};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Lightweight Gemini REST client for the `generateContent` endpoint.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example
    /// `gemini-2.5-flash-image-preview`); a `models/` prefix is stripped.
    /// Without a `timeout` the outbound call waits as long as reqwest does.
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// reqwest errors carry the request URL, which holds the key as a query parameter.
fn redacted(e: reqwest::Error) -> Error {
    Error::Http(e.without_url())
}

#[async_trait]
impl ImageProvider for GeminiHttpClient {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<ProviderReply> {
        tracing::debug!(
            "Sending generateContent request to Gemini (model: {}, parts: {})",
            self.model,
            request.parts().len()
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            let e = redacted(e);
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        let status = response.status();
        let text = response.text().await.map_err(redacted)?;

        if !status.is_success() {
            // Error bodies are forwarded as-is; keep non-JSON text as a string.
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Ok(ProviderReply { status, body });
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            Error::Serialization(e)
        })?;

        Ok(ProviderReply { status, body })
    }
}
