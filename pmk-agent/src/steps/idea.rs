//! Idea refinement.

use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use pmk_core::{IdeaAnalysis, RefinedIdea, Result, UserPersona, require_non_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaInput {
    pub raw_idea: String,
    #[serde(default)]
    pub additional_context: Option<String>,
}

impl IdeaInput {
    pub fn new(raw_idea: impl Into<String>) -> Self {
        Self { raw_idea: raw_idea.into(), additional_context: None }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.additional_context = context;
        self
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct IdeaDraft {
    refined_idea: RefinedIdea,
    personas: Vec<UserPersona>,
    summary: String,
}

fn check(draft: &IdeaDraft) -> std::result::Result<(), String> {
    if draft.refined_idea.title.trim().is_empty() {
        return Err("refinedIdea.title must not be empty".to_string());
    }
    if draft.refined_idea.features.is_empty() {
        return Err("refinedIdea.features must contain at least one feature".to_string());
    }
    if draft.personas.is_empty() {
        return Err("personas must contain at least one persona".to_string());
    }
    Ok(())
}

/// Refine a raw idea into a concept with features and personas.
pub async fn refine_idea(
    ctx: &AgentContext,
    input: IdeaInput,
) -> Result<StepOutput<IdeaAnalysis>> {
    require_non_empty("rawIdea", &input.raw_idea)?;

    let schema = OutputSchema::for_type::<IdeaDraft>()?;
    let prompt = prompts::idea_prompt(&input.raw_idea, input.additional_context.as_deref());
    let output = ctx
        .generator()
        .generate("idea-generation", prompts::IDEA_INSTRUCTION, &prompt, &schema, check)
        .await?;

    Ok(output.map(|draft: IdeaDraft| IdeaAnalysis {
        refined_idea: draft.refined_idea,
        personas: draft.personas,
        summary: draft.summary,
    }))
}
