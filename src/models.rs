//! Data models and structures
//!
//! Defines the inbound generation request, how it maps onto a Gemini payload,
//! and the process-wide configuration.

use crate::ai::gemini::{
    GenerateContentRequest, InlineData, Part, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;

/// Only this mode attaches the caller's image to the outbound payload.
pub const EDIT_MODE: &str = "edit";

/// MIME type sent with edit images.
pub const EDIT_IMAGE_MIME_TYPE: &str = "image/png";

/// Inbound request body: `{ prompt, base64Image?, mode? }`.
///
/// Each field is read on its own: a value that is not a string counts as
/// absent instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub base64_image: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub mode: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl GenerationRequest {
    /// The prompt, if present and non-empty.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// The image to edit, if this is an edit request with a non-empty image.
    pub fn edit_image(&self) -> Option<&str> {
        if self.mode.as_deref() != Some(EDIT_MODE) {
            return None;
        }
        self.base64_image.as_deref().filter(|img| !img.is_empty())
    }

    /// Builds the Gemini payload, or `None` when there is no prompt.
    ///
    /// The text part always comes first; the inline PNG follows only for
    /// edit requests.
    pub fn to_payload(&self) -> Option<GenerateContentRequest> {
        let prompt = self.prompt()?;

        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(image) = self.edit_image() {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: EDIT_IMAGE_MIME_TYPE.to_string(),
                    data: image.to_string(),
                },
            });
        }

        Some(GenerateContentRequest::from_parts(parts))
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Option<Duration>,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
}

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().map_err(|_| {
            crate::Error::Config(format!("BIND_ADDR is not a socket address: {}", bind_addr))
        })?;

        let request_timeout = lookup("GEMINI_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    crate::Error::Config(format!("GEMINI_TIMEOUT_SECS is not a number: {}", secs))
                })
            })
            .transpose()?;

        let max_body_bytes = lookup("MAX_BODY_BYTES")
            .map(|bytes| {
                bytes.parse::<usize>().map_err(|_| {
                    crate::Error::Config(format!("MAX_BODY_BYTES is not a number: {}", bytes))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Ok(Self {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|key| !key.is_empty()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            bind_addr,
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn request(prompt: Option<&str>, image: Option<&str>, mode: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.map(str::to_string),
            base64_image: image.map(str::to_string),
            mode: mode.map(str::to_string),
        }
    }

    fn config_from(vars: &[(&str, &str)]) -> crate::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let parsed: GenerationRequest =
            serde_json::from_str(r#"{"prompt":"a cat","base64Image":"AAAA","mode":"edit"}"#)
                .unwrap();
        assert_eq!(parsed, request(Some("a cat"), Some("AAAA"), Some("edit")));
    }

    #[test]
    fn test_mistyped_fields_count_as_absent() {
        let parsed: GenerationRequest =
            serde_json::from_str(r#"{"prompt":"a cat","base64Image":false,"mode":5}"#).unwrap();
        assert_eq!(parsed, request(Some("a cat"), None, None));

        let parsed: GenerationRequest = serde_json::from_str(r#"{"prompt":42}"#).unwrap();
        assert_eq!(parsed.prompt(), None);
    }

    #[test]
    fn test_whitespace_prompt_is_kept() {
        let payload = request(Some("   "), None, None).to_payload().unwrap();
        assert_eq!(
            payload.parts(),
            &[Part::Text {
                text: "   ".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_prompt_builds_no_payload() {
        assert!(request(None, None, None).to_payload().is_none());
        assert!(request(Some(""), Some("AAAA"), Some("edit")).to_payload().is_none());
    }

    #[test]
    fn test_generate_mode_sends_text_only() {
        let payload = request(Some("a cat"), Some("AAAA"), Some("generate"))
            .to_payload()
            .unwrap();
        assert_eq!(
            payload.parts(),
            &[Part::Text {
                text: "a cat".to_string()
            }]
        );
    }

    #[test]
    fn test_edit_mode_without_image_sends_text_only() {
        let missing = request(Some("a cat"), None, Some("edit")).to_payload().unwrap();
        let empty = request(Some("a cat"), Some(""), Some("edit")).to_payload().unwrap();
        assert_eq!(missing.parts().len(), 1);
        assert_eq!(empty.parts().len(), 1);
    }

    #[test]
    fn test_edit_mode_appends_png_after_text() {
        let payload = request(Some("make it blue"), Some("AAAA"), Some("edit"))
            .to_payload()
            .unwrap();
        assert_eq!(
            payload.parts(),
            &[
                Part::Text {
                    text: "make it blue".to_string()
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "image/png".to_string(),
                        data: "AAAA".to_string(),
                    }
                },
            ]
        );
    }

    #[test]
    fn test_mode_match_is_exact() {
        let payload = request(Some("a cat"), Some("AAAA"), Some("EDIT"))
            .to_payload()
            .unwrap();
        assert_eq!(payload.parts().len(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_config_reads_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_MODEL", "gemini-test"),
            ("GEMINI_TIMEOUT_SECS", "30"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("MAX_BODY_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(config.gemini_model, "gemini-test");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn test_config_treats_empty_key_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "")]).unwrap();
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            config_from(&[("GEMINI_TIMEOUT_SECS", "soon")]),
            Err(crate::Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("BIND_ADDR", "localhost")]),
            Err(crate::Error::Config(_))
        ));
    }
}
