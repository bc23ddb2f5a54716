//! Feedback routing.

use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use pmk_core::{FeedbackDecision, Result, RoutingTarget, require_non_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub feedback: String,
    /// Snapshot of the current artifacts, as JSON.
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct RouterReply {
    target_agent: String,
    confidence: f64,
    reasoning: String,
    suggested_action: String,
    requires_approval: bool,
}

fn check(reply: &RouterReply) -> std::result::Result<(), String> {
    if !(0.0..=1.0).contains(&reply.confidence) {
        return Err(format!("confidence must be between 0 and 1, got {}", reply.confidence));
    }
    Ok(())
}

/// Decide which agent should act on a piece of feedback.
///
/// The model is offered the routable agents plus `none`; a target outside that set is still
/// returned, as [`RoutingTarget::Unknown`], for the caller to handle.
pub async fn route_feedback(
    ctx: &AgentContext,
    input: FeedbackInput,
) -> Result<StepOutput<FeedbackDecision>> {
    require_non_empty("feedback", &input.feedback)?;

    let schema = OutputSchema::for_type::<RouterReply>()?
        .constrain_enum("targetAgent", &RoutingTarget::allowed_values());
    let artifacts = match &input.context {
        Value::Null => "{}".to_string(),
        other => serde_json::to_string_pretty(other)?,
    };
    let prompt = prompts::feedback_prompt(&input.feedback, &artifacts);
    let output = ctx
        .generator()
        .generate("feedback", prompts::FEEDBACK_INSTRUCTION, &prompt, &schema, check)
        .await?;

    let decision = output.map(|reply: RouterReply| FeedbackDecision {
        target_agent: RoutingTarget::from(reply.target_agent),
        confidence: reply.confidence,
        reasoning: reply.reasoning,
        suggested_action: reply.suggested_action,
        requires_approval: reply.requires_approval,
    });
    tracing::info!(
        routed_to = %decision.value.target_agent,
        confidence = decision.value.confidence,
        requires_approval = decision.value.requires_approval,
        "feedback routed"
    );
    Ok(decision)
}
