use super::gemini::GenerateContentRequest;
use super::{ImageProvider, ProviderReply};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Base64 of a PNG signature, returned when no reply has been scripted.
pub const DEFAULT_IMAGE_DATA: &str = "iVBORw0KGgo=";

#[derive(Debug, Clone)]
enum ScriptedReply {
    Reply(ProviderReply),
    Failure(String),
}

/// Scripted [`ImageProvider`] that records every request it receives.
pub struct MockImageProvider {
    replies: Arc<Mutex<Vec<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, status: StatusCode, body: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(ScriptedReply::Reply(ProviderReply { status, body }));
        self
    }

    /// Convenience for a 200 reply whose first candidate carries `data`.
    pub fn with_image_reply(self, data: &str) -> Self {
        self.with_reply(StatusCode::OK, image_body(data))
    }

    /// Makes the call itself fail, as a network error would.
    pub fn with_failure(self, message: String) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(ScriptedReply::Failure(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn recorded_requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn image_body(data: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "inlineData": { "mimeType": "image/png", "data": data }
                }]
            }
        }]
    })
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<ProviderReply> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(ProviderReply {
                status: StatusCode::OK,
                body: image_body(DEFAULT_IMAGE_DATA),
            });
        }

        match &replies[(count - 1) % replies.len()] {
            ScriptedReply::Reply(reply) => Ok(reply.clone()),
            ScriptedReply::Failure(message) => Err(Error::Generic(message.clone())),
        }
    }
}
