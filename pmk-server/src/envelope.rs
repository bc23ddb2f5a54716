//! The `{success, data, error, metadata}` envelope every route answers with.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pmk_agent::StepOutput;
use pmk_core::{PmkError, ToolCall, UsageMetadata};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub agent_type: String,
    /// Milliseconds spent handling the request.
    pub processing_time: u64,
    pub confidence: f64,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ResponseMetadata,
}

/// Per-request bookkeeping: which agent answered, for which session, since when.
pub struct Responder {
    agent_type: &'static str,
    session_id: String,
    started: Instant,
    expose_error_details: bool,
}

impl Responder {
    /// Start timing a request. A missing or blank session id gets a fresh one.
    pub fn start(
        agent_type: &'static str,
        session_id: Option<String>,
        expose_error_details: bool,
    ) -> Self {
        let session_id = session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self { agent_type, session_id, started: Instant::now(), expose_error_details }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn metadata(&self, confidence: f64) -> ResponseMetadata {
        ResponseMetadata {
            agent_type: self.agent_type.to_string(),
            processing_time: self.started.elapsed().as_millis() as u64,
            confidence,
            session_id: self.session_id.clone(),
            usage: None,
            tool_calls: None,
        }
    }

    /// 200 with the step's value, usage and tool calls.
    pub fn step<T: Serialize>(&self, output: StepOutput<T>) -> Response {
        let confidence = output.confidence();
        self.step_with_confidence(output, confidence)
    }

    /// Like [`Responder::step`], for steps that report their own confidence.
    pub fn step_with_confidence<T: Serialize>(
        &self,
        output: StepOutput<T>,
        confidence: f64,
    ) -> Response {
        let mut metadata = self.metadata(confidence);
        metadata.usage = Some(output.usage);
        if !output.tool_calls.is_empty() {
            metadata.tool_calls = Some(output.tool_calls);
        }
        self.send(StatusCode::OK, Some(output.value), None, metadata)
    }

    /// 200 with an arbitrary payload.
    pub fn data<T: Serialize>(&self, data: T, confidence: f64) -> Response {
        self.send(StatusCode::OK, Some(data), None, self.metadata(confidence))
    }

    pub fn fail(&self, status: StatusCode, message: impl Into<String>) -> Response {
        self.send::<()>(status, None, Some(message.into()), self.metadata(0.0))
    }

    /// Map an error onto 400 (caller's fault) or 500 (everything else, configuration
    /// included).
    pub fn error(&self, error: PmkError) -> Response {
        if error.is_client_error() {
            tracing::info!(agent = self.agent_type, error = %error, "request rejected");
            return self.fail(StatusCode::BAD_REQUEST, error.to_string());
        }
        tracing::error!(
            agent = self.agent_type,
            session.id = %self.session_id,
            kind = error.kind(),
            error = %error,
            "request failed"
        );
        // configuration messages name a variable, never a value
        let message = if self.expose_error_details || matches!(error, PmkError::Config(_)) {
            error.to_string()
        } else {
            format!("{} agent failed ({})", self.agent_type, error.kind())
        };
        self.fail(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A body that is not valid JSON for the route.
    pub fn rejection(&self, rejection: JsonRejection) -> Response {
        let message = format!("Invalid request body: {}", rejection.body_text());
        self.fail(StatusCode::BAD_REQUEST, message)
    }

    fn send<T: Serialize>(
        &self,
        status: StatusCode,
        data: Option<T>,
        error: Option<String>,
        metadata: ResponseMetadata,
    ) -> Response {
        let envelope = Envelope { success: error.is_none(), data, error, metadata };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_session_id_is_replaced() {
        let responder = Responder::start("prd", Some(" ".into()), false);
        assert!(!responder.session_id().trim().is_empty());
        let responder = Responder::start("prd", Some("s-9".into()), false);
        assert_eq!(responder.session_id(), "s-9");
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let responder = Responder::start("idea-generation", Some("s".into()), false);
        let envelope = Envelope::<()> {
            success: false,
            data: None,
            error: Some("Message is required".into()),
            metadata: responder.metadata(0.0),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["metadata"]["agentType"], "idea-generation");
        assert_eq!(json["metadata"]["sessionId"], "s");
        assert!(json["metadata"].get("usage").is_none());
    }

    #[tokio::test]
    async fn test_config_error_is_server_error() {
        use http_body_util::BodyExt;

        let err = PmkError::Config("LINEAR_TEAM_ID is not set".into());
        let response = Responder::start("sprint-planner", None, false).error(err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Configuration error: LINEAR_TEAM_ID is not set");

        let err = PmkError::Validation("Message is required".into());
        let response = Responder::start("idea-generation", None, false).error(err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
