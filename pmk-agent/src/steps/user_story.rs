//! User-story generation.

use super::to_prompt_json;
use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use pmk_core::{
    PmkError, Priority, RefinedIdea, Result, UserPersona, UserStory, UserStoryAnalysis,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoryInput {
    pub refined_idea: RefinedIdea,
    #[serde(default)]
    pub personas: Vec<UserPersona>,
    #[serde(default)]
    pub additional_context: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct StoryDraft {
    title: String,
    persona: String,
    action: String,
    benefit: String,
    acceptance_criteria: Vec<String>,
    priority: Priority,
    story_points: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct StoriesDraft {
    user_stories: Vec<StoryDraft>,
    summary: String,
}

/// Largest story-point estimate accepted from the model.
pub const MAX_STORY_POINTS: u32 = 100;

/// `personas` are the known persona names; empty accepts any persona.
fn check_draft(draft: &StoriesDraft, personas: &[String]) -> std::result::Result<(), String> {
    if draft.user_stories.is_empty() {
        return Err("userStories must contain at least one story".to_string());
    }
    let out_of_range =
        draft.user_stories.iter().find(|s| !(1..=MAX_STORY_POINTS).contains(&s.story_points));
    if let Some(story) = out_of_range {
        return Err(format!(
            "story '{}' has storyPoints {}; estimates must be between 1 and {MAX_STORY_POINTS}",
            story.title, story.story_points
        ));
    }
    if personas.is_empty() {
        return Ok(());
    }
    let unknown = draft.user_stories.iter().find(|s| {
        !personas.iter().any(|name| name.eq_ignore_ascii_case(s.persona.trim()))
    });
    match unknown {
        Some(story) => Err(format!(
            "story '{}' names unknown persona '{}'; use one of: {}",
            story.title,
            story.persona,
            personas.join(", ")
        )),
        None => Ok(()),
    }
}

/// Write user stories for a refined idea. Ids are assigned here, in reply order.
pub async fn generate_user_stories(
    ctx: &AgentContext,
    input: UserStoryInput,
) -> Result<StepOutput<UserStoryAnalysis>> {
    let idea = &input.refined_idea;
    if idea.title.trim().is_empty() && idea.problem_statement.trim().is_empty() {
        return Err(PmkError::missing_field("refinedIdea"));
    }

    let schema = OutputSchema::for_type::<StoriesDraft>()?;
    let prompt = prompts::user_story_prompt(
        &to_prompt_json(&input.refined_idea)?,
        &to_prompt_json(&input.personas)?,
        input.additional_context.as_deref(),
    );
    let personas: Vec<String> =
        input.personas.iter().map(|p| p.name.trim().to_string()).collect();
    let check = move |draft: &StoriesDraft| check_draft(draft, &personas);
    let output = ctx
        .generator()
        .generate("user-story", prompts::USER_STORY_INSTRUCTION, &prompt, &schema, check)
        .await?;

    output.try_map(|draft: StoriesDraft| {
        let stories = draft
            .user_stories
            .into_iter()
            .enumerate()
            .map(|(index, story)| UserStory {
                id: UserStory::id_for_index(index),
                title: story.title,
                persona: story.persona,
                action: story.action,
                benefit: story.benefit,
                acceptance_criteria: story.acceptance_criteria,
                priority: story.priority,
                story_points: story.story_points,
            })
            .collect();
        UserStoryAnalysis::new(stories, draft.summary)
    })
}
