pub mod client;
pub mod types;

pub use client::{GeminiHttpClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::{find_inline_image, Content, GenerateContentRequest, InlineData, Part};
