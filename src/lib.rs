//! HTTP relay between a browser client and Gemini image generation
//!
//! Accepts a prompt (and optionally a PNG to edit), forwards it to the Gemini
//! `generateContent` endpoint and hands the generated image back as base64.

pub mod ai;
pub mod error;
pub mod models;
pub mod relay;
pub mod server;

pub use error::{Error, Result};
