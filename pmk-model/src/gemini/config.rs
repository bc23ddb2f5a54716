//! Configuration types for the Gemini provider.

use pmk_core::{PmkError, Result};
use serde::{Deserialize, Serialize};

/// Default Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used when `PMK_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variables checked for the API key, in order.
const API_KEY_VARS: [&str; 3] =
    ["GOOGLE_GENERATIVE_AI_API_KEY", "GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Configuration for the Gemini API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Optional custom base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: String::new(), model: DEFAULT_MODEL.to_string(), base_url: None }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), base_url: None }
    }

    /// Read the key from `GOOGLE_GENERATIVE_AI_API_KEY` (falling back to `GOOGLE_API_KEY`
    /// and `GEMINI_API_KEY`) and the model from `PMK_MODEL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                PmkError::Config(format!(
                    "Gemini API key not set (expected one of {})",
                    API_KEY_VARS.join(", ")
                ))
            })?;
        let model = lookup("PMK_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the effective base URL.
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GEMINI_API_BASE)
    }
}
