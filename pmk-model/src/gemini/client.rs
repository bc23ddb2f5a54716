//! Gemini client implementation.

use super::config::GeminiConfig;
use super::convert::{self, GenerateContentResponse};
use crate::retry::{RetryConfig, execute_with_retry, is_retryable_model_error};
use async_trait::async_trait;
use pmk_core::{Llm, LlmRequest, LlmResponse, PmkError, Result, Vendor};
use reqwest::Client;

/// Gemini client over the `generateContent` REST endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use pmk_model::{GeminiClient, GeminiConfig};
///
/// let client = GeminiClient::new(GeminiConfig::new(api_key, "gemini-2.0-flash"))?;
/// ```
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    retry_config: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PmkError::Model(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    fn api_url(&self, model: &str) -> String {
        let base = self.config.effective_base_url().trim_end_matches('/');
        format!("{base}/v1beta/models/{model}:generateContent")
    }

    async fn send_once(
        &self,
        url: &str,
        body: &convert::GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| PmkError::Transport { vendor: Vendor::Gemini, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PmkError::VendorApi {
                vendor: Vendor::Gemini,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| PmkError::Model(format!("Failed to decode Gemini response: {e}")))
    }
}

#[async_trait]
impl Llm for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(&self, request: LlmRequest) -> Result<LlmResponse> {
        let model =
            if request.model.is_empty() { self.config.model.as_str() } else { &request.model };
        let url = self.api_url(model);
        let body = convert::build_request(&request);

        tracing::debug!(model = %model, contents = body.contents.len(), "Sending Gemini request");

        let response = execute_with_retry(&self.retry_config, is_retryable_model_error, || {
            self.send_once(&url, &body)
        })
        .await?;

        let block_reason = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone());
        convert::from_response(response).ok_or_else(|| match block_reason {
            Some(reason) => PmkError::Model(format!("Gemini blocked the prompt: {reason}")),
            None => PmkError::Model("Gemini returned no candidates".to_string()),
        })
    }
}
