//! Sprint planning and optional Linear sync.

use super::to_prompt_json;
use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use chrono::{Days, NaiveDate, Utc};
use pmk_core::{
    ExternalCycle, ExternalIssue, LinearIntegration, PmkError, Result, Sprint, SprintAssignment,
    SprintLength, SprintPlan, UserStory,
};
use pmk_integrations::{CycleInput, IssueInput, IssueTracker, run_best_effort};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintInput {
    pub user_stories: Vec<UserStory>,
    pub team_size: u32,
    #[serde(default)]
    pub sprint_length: SprintLength,
    pub total_sprints: u32,
    #[serde(default)]
    pub create_linear_project: bool,
    #[serde(default)]
    pub additional_context: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SprintDraft {
    sprints: Vec<SprintAssignment>,
}

/// Plan sprints for the given stories and, when asked, mirror them into Linear.
///
/// The model proposes exactly `total_sprints` sprints of story ids; unknown or repeated ids
/// fail the step with [`PmkError::DataIntegrity`]. Linear sync is best-effort per cycle
/// and per issue, with failures collected in the plan.
pub async fn plan_sprints(
    ctx: &AgentContext,
    input: SprintInput,
) -> Result<StepOutput<SprintPlan>> {
    if input.user_stories.is_empty() {
        return Err(PmkError::missing_field("userStories"));
    }
    if input.team_size == 0 {
        return Err(PmkError::Validation("teamSize must be a positive number".to_string()));
    }
    if input.total_sprints == 0 {
        return Err(PmkError::Validation("totalSprints must be a positive number".to_string()));
    }
    let linear = if input.create_linear_project {
        let tracker = ctx.issue_tracker()?;
        let team_id = tracker.default_team_id().map(str::to_string).ok_or_else(|| {
            PmkError::Config("LINEAR_TEAM_ID is not set; cannot create a Linear project".into())
        })?;
        Some((tracker, team_id))
    } else {
        None
    };

    let total = input.total_sprints as usize;
    let check = move |draft: &SprintDraft| {
        if draft.sprints.len() == total {
            Ok(())
        } else {
            Err(format!("expected exactly {total} sprints, got {}", draft.sprints.len()))
        }
    };

    let schema = OutputSchema::for_type::<SprintDraft>()?;
    let prompt = prompts::sprint_prompt(
        &to_prompt_json(&input.user_stories)?,
        input.team_size,
        input.sprint_length.as_str(),
        input.total_sprints,
        input.additional_context.as_deref(),
    );
    let output = ctx
        .generator()
        .generate("sprint-planner", prompts::SPRINT_INSTRUCTION, &prompt, &schema, check)
        .await?;

    let output = output.map(|draft: SprintDraft| draft.sprints);
    let mut plan = SprintPlan::from_assignments(
        output.value.clone(),
        &input.user_stories,
        input.sprint_length,
    )?;

    if let Some((tracker, team_id)) = linear {
        let start = Utc::now().date_naive();
        plan.linear_integration = sync_to_linear(
            tracker,
            &team_id,
            &plan.sprints,
            &input.user_stories,
            start,
            input.sprint_length,
            ctx.settings.batch_concurrency,
        )
        .await;
    }

    Ok(output.map(|_| plan))
}

fn cycle_window(start: NaiveDate, index: usize, length: SprintLength) -> (NaiveDate, NaiveDate) {
    let days = u64::from(length.weeks()) * 7;
    let from = start.checked_add_days(Days::new(days * index as u64)).unwrap_or(start);
    let to = from.checked_add_days(Days::new(days)).unwrap_or(from);
    (from, to)
}

/// Create one cycle per sprint, then one issue per assigned story.
pub(crate) async fn sync_to_linear(
    tracker: Arc<dyn IssueTracker>,
    team_id: &str,
    sprints: &[Sprint],
    stories: &[UserStory],
    start: NaiveDate,
    length: SprintLength,
    concurrency: usize,
) -> LinearIntegration {
    let cycle_items: Vec<(usize, Sprint)> = sprints.iter().cloned().enumerate().collect();
    let cycles = run_best_effort(cycle_items, concurrency, |(index, sprint)| {
        let tracker = tracker.clone();
        let (from, to) = cycle_window(start, index, length);
        async move {
            let created = tracker
                .create_cycle(team_id, CycleInput {
                    name: sprint.name.clone(),
                    description: sprint.goal.clone(),
                    starts_at: from.to_string(),
                    ends_at: to.to_string(),
                })
                .await?;
            Ok(ExternalCycle { sprint_id: sprint.id, id: created.id, url: None })
        }
    })
    .await;

    let cycle_for_sprint: HashMap<&str, &str> =
        cycles.succeeded.iter().map(|c| (c.sprint_id.as_str(), c.id.as_str())).collect();
    let by_id: HashMap<&str, &UserStory> = stories.iter().map(|s| (s.id.as_str(), s)).collect();

    let issue_items: Vec<(UserStory, Option<String>)> = sprints
        .iter()
        .flat_map(|sprint| {
            let cycle_id = cycle_for_sprint.get(sprint.id.as_str()).map(|id| id.to_string());
            sprint
                .user_story_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(move |story| ((*story).clone(), cycle_id.clone()))
        })
        .collect();

    let issues = run_best_effort(issue_items, concurrency, |(story, cycle_id)| {
        let tracker = tracker.clone();
        async move {
            let created = tracker
                .create_issue(team_id, IssueInput {
                    title: story.title.clone(),
                    description: issue_description(&story),
                    priority: story.priority,
                    estimate: Some(story.story_points),
                    cycle_id,
                })
                .await?;
            Ok(ExternalIssue {
                story_id: story.id,
                id: created.id,
                identifier: created.identifier,
                url: created.url,
            })
        }
    })
    .await;

    let mut errors = cycles.item_errors(|(_, sprint)| format!("cycle {}", sprint.id));
    errors.extend(issues.item_errors(|(story, _)| format!("issue {}", story.id)));
    tracing::info!(
        cycles = cycles.succeeded.len(),
        issues = issues.succeeded.len(),
        failures = errors.len(),
        "Linear sync finished"
    );

    LinearIntegration {
        enabled: true,
        team_id: Some(team_id.to_string()),
        cycles: cycles.succeeded,
        issues: issues.succeeded,
        errors,
    }
}

fn issue_description(story: &UserStory) -> String {
    let mut description = story.narrative();
    if !story.acceptance_criteria.is_empty() {
        description.push_str("\n\n**Acceptance criteria**\n");
        for criterion in &story.acceptance_criteria {
            description.push_str(&format!("- [ ] {criterion}\n"));
        }
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_windows_are_contiguous() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let (a_from, a_to) = cycle_window(start, 0, SprintLength::TwoWeeks);
        let (b_from, _) = cycle_window(start, 1, SprintLength::TwoWeeks);
        assert_eq!(a_from, start);
        assert_eq!(a_to, NaiveDate::from_ymd_opt(2026, 1, 19).unwrap());
        assert_eq!(b_from, a_to);
    }
}
