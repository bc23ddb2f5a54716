//! Structured generation: prompt, validate, deserialize, repair.

use crate::schema::OutputSchema;
use crate::settings::AgentSettings;
use pmk_core::{
    GenerateContentConfig, Llm, LlmRequest, PmkError, Result, ToolCall, UsageMetadata, Vendor,
};
use pmk_telemetry::Instrument;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A typed value produced by one step, with what it cost to get it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutput<T> {
    pub value: T,
    pub usage: UsageMetadata,
    pub tool_calls: Vec<ToolCall>,
    /// Model calls made, including repairs.
    pub attempts: u32,
}

impl<T> StepOutput<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepOutput<U> {
        StepOutput {
            value: f(self.value),
            usage: self.usage,
            tool_calls: self.tool_calls,
            attempts: self.attempts,
        }
    }

    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<StepOutput<U>> {
        Ok(StepOutput {
            value: f(self.value)?,
            usage: self.usage,
            tool_calls: self.tool_calls,
            attempts: self.attempts,
        })
    }

    /// 1.0 when the first reply was usable, lower once repairs were needed.
    pub fn confidence(&self) -> f64 {
        if self.attempts <= 1 { 1.0 } else { 0.75 }
    }
}

/// Issues a schema-constrained model call and turns the reply into `T`.
pub struct StructuredGenerator {
    llm: Arc<dyn Llm>,
    settings: AgentSettings,
}

impl StructuredGenerator {
    pub fn new(llm: Arc<dyn Llm>, settings: AgentSettings) -> Self {
        Self { llm, settings }
    }

    /// Ask the model for a `T`.
    ///
    /// The reply must parse as JSON, satisfy `schema`, deserialize into `T` and pass
    /// `check`. A reply failing any of these is sent back with the reason, up to
    /// `max_repair_attempts` times; after that the step fails with
    /// [`PmkError::MalformedAgentResponse`] carrying the last raw reply. Errors from the
    /// model call itself are returned as they are.
    pub async fn generate<T, C>(
        &self,
        step: &str,
        system_instruction: &str,
        prompt: &str,
        schema: &OutputSchema,
        check: C,
    ) -> Result<StepOutput<T>>
    where
        T: DeserializeOwned,
        C: Fn(&T) -> std::result::Result<(), String>,
    {
        let mut usage = UsageMetadata::default();
        let mut tool_calls = Vec::new();
        let mut attempts: u32 = 0;
        let mut current_prompt = prompt.to_string();

        loop {
            attempts += 1;
            let request = self.request(system_instruction, &current_prompt, schema);
            let span = pmk_telemetry::model_call_span(self.llm.name(), step);
            span.record("attempt", attempts);
            let response = self.call(request).instrument(span).await?;

            if let Some(call_usage) = response.usage_metadata {
                usage = usage.merge(call_usage);
            }
            tool_calls.extend(response.tool_calls());
            let raw = response.text_content();

            let reason = match parse_reply::<T>(&raw, schema) {
                Ok(value) => match check(&value) {
                    Ok(()) => {
                        tracing::debug!(step, attempts, "structured reply accepted");
                        return Ok(StepOutput { value, usage, tool_calls, attempts });
                    }
                    Err(reason) => reason,
                },
                Err(reason) => reason,
            };

            if attempts > self.settings.max_repair_attempts {
                tracing::warn!(step, attempts, reason = %reason, "giving up on malformed reply");
                return Err(PmkError::MalformedAgentResponse {
                    step: step.to_string(),
                    reason,
                    raw,
                });
            }
            tracing::info!(step, attempts, reason = %reason, "reply rejected; asking for a repair");
            current_prompt = repair_prompt(prompt, &reason);
        }
    }

    fn request(&self, system_instruction: &str, prompt: &str, schema: &OutputSchema) -> LlmRequest {
        let config =
            GenerateContentConfig { temperature: self.settings.temperature, ..Default::default() };
        LlmRequest::from_prompt(self.llm.name(), prompt)
            .with_system_instruction(system_instruction)
            .with_config(config)
            .with_response_schema(schema.model_schema().clone())
    }

    async fn call(&self, request: LlmRequest) -> Result<pmk_core::LlmResponse> {
        let timeout = self.settings.llm_timeout();
        match tokio::time::timeout(timeout, self.llm.generate_content(request)).await {
            Ok(result) => result,
            Err(_) => Err(PmkError::Transport {
                vendor: Vendor::Gemini,
                message: format!("model call timed out after {}s", timeout.as_secs()),
            }),
        }
    }
}

fn repair_prompt(original: &str, reason: &str) -> String {
    format!(
        "{original}\n\nYour previous reply could not be used: {reason}\n\
         Reply again with ONLY a single JSON object that matches the response schema exactly. \
         Do not add prose, comments or code fences."
    )
}

/// Strip a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_reply<T: DeserializeOwned>(
    raw: &str,
    schema: &OutputSchema,
) -> std::result::Result<T, String> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err("the reply was empty".to_string());
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("the reply is not valid JSON ({e})"))?;
    schema.validate(&value).map_err(|e| format!("the reply does not match the schema: {e}"))?;
    serde_json::from_value(value).map_err(|e| format!("the reply has the wrong shape: {e}"))
}
