//! # pmk-model
//!
//! Model clients implementing [`pmk_core::Llm`].
//!
//! - [`GeminiClient`] - Google Gemini over the public REST API
//! - [`MockLlm`] - scripted responses for tests and offline runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use pmk_model::{GeminiClient, GeminiConfig};
//!
//! let model = GeminiClient::new(GeminiConfig::from_env()?)?;
//! ```

pub mod gemini;
pub mod mock;
pub mod retry;

pub use gemini::{DEFAULT_MODEL, GEMINI_API_BASE, GeminiClient, GeminiConfig};
pub use mock::MockLlm;
pub use retry::RetryConfig;
