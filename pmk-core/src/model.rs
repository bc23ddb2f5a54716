use crate::{Result, types::Content, types::Part};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The model-invocation capability every agent step is built on.
#[async_trait]
pub trait Llm: Send + Sync {
    fn name(&self) -> &str;
    async fn generate_content(&self, req: LlmRequest) -> Result<LlmResponse>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub config: Option<GenerateContentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<i32>,
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: Option<Content>,
    pub usage_metadata: Option<UsageMetadata>,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: i32,
    pub candidates_token_count: i32,
    pub total_token_count: i32,
}

/// A function call emitted by the model, surfaced to callers as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub name: String,
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self { model: model.into(), system_instruction: None, contents, config: None }
    }

    /// Single-turn request holding one user message.
    pub fn from_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(model, vec![Content::new("user").with_text(prompt)])
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Request JSON output conforming to `schema`.
    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        let config = self.config.get_or_insert_with(GenerateContentConfig::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }

    pub fn with_config(mut self, config: GenerateContentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Text of the last user turn, if any.
    pub fn prompt_text(&self) -> String {
        self.contents.iter().rev().find(|c| c.role == "user").map(Content::text).unwrap_or_default()
    }
}

impl LlmResponse {
    pub fn new(content: Content) -> Self {
        Self {
            content: Some(content),
            usage_metadata: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Convenience constructor for a plain text model turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Content::new("model").with_text(text))
    }

    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage_metadata = Some(usage);
        self
    }

    pub fn text_content(&self) -> String {
        self.content.as_ref().map(Content::text).unwrap_or_default()
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|part| match part {
                Part::FunctionCall { name, args, .. } => {
                    Some(ToolCall { name: name.clone(), args: args.clone() })
                }
                _ => None,
            })
            .collect()
    }
}

impl UsageMetadata {
    /// Sum two usage records; used to total usage across repair attempts and steps.
    pub fn merge(self, other: UsageMetadata) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: self.prompt_token_count + other.prompt_token_count,
            candidates_token_count: self.candidates_token_count + other.candidates_token_count,
            total_token_count: self.total_token_count + other.total_token_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_creation() {
        let req = LlmRequest::from_prompt("test-model", "hello");
        assert_eq!(req.model, "test-model");
        assert_eq!(req.prompt_text(), "hello");
        assert!(req.config.is_none());
    }

    #[test]
    fn test_llm_request_with_response_schema() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        });
        let req = LlmRequest::new("test-model", vec![]).with_response_schema(schema.clone());

        let config = req.config.unwrap();
        assert_eq!(config.response_schema, Some(schema));
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_response_schema_keeps_existing_config() {
        let config = GenerateContentConfig { temperature: Some(0.2), ..Default::default() };
        let req = LlmRequest::new("m", vec![])
            .with_config(config)
            .with_response_schema(serde_json::json!({}));
        assert_eq!(req.config.unwrap().temperature, Some(0.2));
    }

    #[test]
    fn test_llm_response_tool_calls() {
        let content = Content::new("model")
            .with_text("ok")
            .with_function_call("create_issue", serde_json::json!({"title": "x"}));
        let resp = LlmResponse::new(content);
        assert_eq!(resp.text_content(), "ok");
        let calls = resp.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "create_issue");
    }

    #[test]
    fn test_usage_merge() {
        let a = UsageMetadata {
            prompt_token_count: 1,
            candidates_token_count: 2,
            total_token_count: 3,
        };
        let merged = a.merge(a);
        assert_eq!(merged.total_token_count, 6);
        assert_eq!(merged.prompt_token_count, 2);
    }
}
