//! Wire types for the Gemini `generateContent` endpoint.

use pmk_core::{Content, FinishReason, LlmRequest, LlmResponse, Part, UsageMetadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<WireUsage>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_token_count: i32,
    #[serde(default)]
    pub candidates_token_count: i32,
    #[serde(default)]
    pub total_token_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

fn content_to_wire(content: &Content) -> WireContent {
    let role = if content.role == "user" { "user" } else { "model" };
    let parts = content
        .parts
        .iter()
        .map(|part| match part {
            Part::Text { text } => WirePart { text: Some(text.clone()), function_call: None },
            Part::FunctionCall { name, args, .. } => WirePart {
                text: None,
                function_call: Some(WireFunctionCall { name: name.clone(), args: args.clone() }),
            },
        })
        .collect();
    WireContent { role: Some(role.to_string()), parts }
}

pub fn build_request(request: &LlmRequest) -> GenerateContentRequest {
    let system_instruction = request.system_instruction.as_ref().map(|text| WireContent {
        role: None,
        parts: vec![WirePart { text: Some(text.clone()), function_call: None }],
    });

    let generation_config = request.config.as_ref().map(|c| GenerationConfig {
        temperature: c.temperature,
        top_p: c.top_p,
        top_k: c.top_k,
        max_output_tokens: c.max_output_tokens,
        response_mime_type: c.response_mime_type.clone(),
        response_schema: c.response_schema.clone(),
    });

    GenerateContentRequest {
        contents: request.contents.iter().map(content_to_wire).collect(),
        system_instruction,
        generation_config,
    }
}

fn finish_reason(raw: &str) -> FinishReason {
    match raw {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" => FinishReason::Safety,
        "RECITATION" => FinishReason::Recitation,
        _ => FinishReason::Other,
    }
}

/// Convert the first candidate into an [`LlmResponse`]. Returns `None` when the
/// response carries no candidate at all.
pub fn from_response(response: GenerateContentResponse) -> Option<LlmResponse> {
    let candidate = response.candidates.into_iter().next()?;

    let mut content = Content::new("model");
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(call) = part.function_call {
            content = content.with_function_call(call.name, call.args);
        } else if let Some(text) = part.text {
            content = content.with_text(text);
        }
    }

    let usage_metadata = response.usage_metadata.map(|u| UsageMetadata {
        prompt_token_count: u.prompt_token_count,
        candidates_token_count: u.candidates_token_count,
        total_token_count: u.total_token_count,
    });

    Some(LlmResponse {
        content: Some(content),
        usage_metadata,
        finish_reason: candidate.finish_reason.as_deref().map(finish_reason),
    })
}
