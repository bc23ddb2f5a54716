//! Google Gemini provider.
//!
//! Talks to the `generateContent` REST endpoint directly with `reqwest`. Structured
//! output is requested through `generationConfig.responseSchema`.

mod client;
mod config;
mod convert;

pub use client::GeminiClient;
pub use config::{DEFAULT_MODEL, GEMINI_API_BASE, GeminiConfig};
