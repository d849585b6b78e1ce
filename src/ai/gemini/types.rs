//! Gemini `generateContent` payload types and response lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini content container holding an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload used for image edit requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Top-level `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Wraps `parts` into the single content block Gemini expects.
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content { parts }],
        }
    }

    /// Parts of the first (and only) content block.
    pub fn parts(&self) -> &[Part] {
        self.contents
            .first()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}

/// Finds the base64 image data in a `generateContent` response.
///
/// Only `candidates[0]` is inspected; within it the first part carrying an
/// `inlineData` object wins. Returns `None` when there are no candidates or
/// no such part.
pub fn find_inline_image(body: &Value) -> Option<&str> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .find_map(|part| part.get("inlineData").filter(|d| d.is_object()))?
        .get("data")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_gemini_wire_shape() {
        let request = GenerateContentRequest::from_parts(vec![
            Part::Text {
                text: "a cat".to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                },
            },
        ]);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{
                    "parts": [
                        { "text": "a cat" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_find_inline_image_skips_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                        { "inlineData": { "mimeType": "image/png", "data": "BBBB" } }
                    ]
                }
            }]
        });

        assert_eq!(find_inline_image(&body), Some("AAAA"));
    }

    #[test]
    fn test_find_inline_image_only_reads_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "no image" }] } },
                { "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "AAAA" } }] } }
            ]
        });

        assert_eq!(find_inline_image(&body), None);
    }

    #[test]
    fn test_find_inline_image_with_zero_candidates() {
        assert_eq!(find_inline_image(&json!({ "candidates": [] })), None);
        assert_eq!(find_inline_image(&json!({})), None);
    }

    #[test]
    fn test_find_inline_image_ignores_null_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": null },
                        { "inlineData": { "mimeType": "image/png", "data": "CCCC" } }
                    ]
                }
            }]
        });

        assert_eq!(find_inline_image(&body), Some("CCCC"));
    }

    #[test]
    fn test_find_inline_image_requires_string_data() {
        let missing = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "image/png" } },
                        { "inlineData": { "mimeType": "image/png", "data": "DDDD" } }
                    ]
                }
            }]
        });
        let numeric = json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": 7 } }] }
            }]
        });

        assert_eq!(find_inline_image(&missing), None);
        assert_eq!(find_inline_image(&numeric), None);
    }
}
