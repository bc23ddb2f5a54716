//! PRD writing and optional publishing.

use super::to_prompt_json;
use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use pmk_core::{PmkError, PrdAnalysis, PrdDocument, PublishedPage, RefinedIdea, Result, UserStory};
use pmk_integrations::prd_blocks;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdInput {
    pub refined_idea: RefinedIdea,
    pub user_stories: Vec<UserStory>,
    #[serde(default)]
    pub additional_context: Option<String>,
    #[serde(default)]
    pub publish_to_notion: bool,
}

fn check(prd: &PrdDocument) -> std::result::Result<(), String> {
    if prd.title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    if prd.functional_requirements.is_empty() {
        return Err("functionalRequirements must contain at least one requirement".to_string());
    }
    Ok(())
}

/// Write a PRD from the idea and its stories, publishing it to Notion when asked.
///
/// Every requirement link must name a story from the input. Publishing needs a configured
/// document publisher; any failure while publishing fails the step.
pub async fn write_prd(ctx: &AgentContext, input: PrdInput) -> Result<StepOutput<PrdAnalysis>> {
    if input.user_stories.is_empty() {
        return Err(PmkError::missing_field("userStories"));
    }
    let publisher = if input.publish_to_notion { Some(ctx.document_publisher()?) } else { None };

    let schema = OutputSchema::for_type::<PrdDocument>()?;
    let prompt = prompts::prd_prompt(
        &to_prompt_json(&input.refined_idea)?,
        &to_prompt_json(&input.user_stories)?,
        input.additional_context.as_deref(),
    );
    let output = ctx
        .generator()
        .generate("prd", prompts::PRD_INSTRUCTION, &prompt, &schema, check)
        .await?;
    output.value.validate_story_links(&input.user_stories)?;

    let published_page = match publisher {
        Some(publisher) => {
            let page = publisher.create_page(&output.value.title).await?;
            publisher.append_blocks(&page.page_id, prd_blocks(&output.value)).await?;
            tracing::info!(page_id = %page.page_id, "PRD published to Notion");
            Some(page)
        }
        None => None,
    };

    Ok(output.map(|prd| analysis(prd, published_page)))
}

fn analysis(prd: PrdDocument, published_page: Option<PublishedPage>) -> PrdAnalysis {
    let markdown = prd.to_markdown();
    PrdAnalysis { prd, markdown, published_page }
}
