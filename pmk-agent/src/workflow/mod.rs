//! The conversational workflow: runs the steps in order, threads each artifact into the
//! next step and lets feedback send the run back to an earlier step.

mod request;
mod run;

pub use request::WorkflowRequest;
pub use run::{FeedbackOutcome, PendingFeedback, StepFailure, WorkflowRun};

use crate::context::AgentContext;
use crate::feedback::{FeedbackInput, route_feedback};
use crate::steps::{
    IdeaInput, PrdInput, SprintInput, UserStoryInput, VisualInput, design_visuals,
    generate_user_stories, plan_sprints, refine_idea, write_prd,
};
use crate::structured::StepOutput;
use pmk_core::{
    FeedbackDecision, PmkError, Result, RoutingTarget, UsageMetadata, WorkflowStep,
    require_non_empty,
};
use pmk_telemetry::{Instrument, step_span, workflow_run_span};
use tracing::{info, warn};

/// Feedback being applied to one step during a re-run.
#[derive(Debug, Clone, Copy)]
struct StepFeedback<'a> {
    step: WorkflowStep,
    text: &'a str,
}

pub struct ConversationalWorkflow {
    ctx: AgentContext,
}

impl ConversationalWorkflow {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AgentContext {
        &self.ctx
    }

    /// Run every enabled step from the idea onwards.
    ///
    /// Only an invalid request is an `Err`. A failing step stops the run and is reported in
    /// [`WorkflowRun::failure`], with everything produced before it kept.
    pub async fn run(&self, request: WorkflowRequest) -> Result<WorkflowRun> {
        request.validate()?;
        let mut run = WorkflowRun::new(request);
        let span = workflow_run_span(run.session_id());
        async {
            info!("workflow started");
            self.execute_from(&mut run, WorkflowStep::Idea, None).await;
            info!(
                status = ?run.session.status,
                completion = run.session.quality_metrics.completion_percentage,
                "workflow finished"
            );
        }
        .instrument(span)
        .await;
        Ok(run)
    }

    /// Route feedback for `run`. Decisions that need approval are parked on the run;
    /// the rest are applied straight away.
    pub async fn handle_feedback(
        &self,
        run: &mut WorkflowRun,
        feedback: &str,
    ) -> Result<FeedbackOutcome> {
        require_non_empty("feedback", feedback)?;
        let input =
            FeedbackInput { feedback: feedback.to_string(), context: run.artifacts_snapshot() };
        let decision = route_feedback(&self.ctx, input).await?.value;

        if decision.requires_approval {
            info!(
                session.id = run.session_id(),
                routed_to = %decision.target_agent,
                "feedback awaiting approval"
            );
            // a newer decision replaces the parked one but keeps the status to restore
            let previous_status = run
                .pending_feedback
                .take()
                .map_or(run.session.status, |parked| parked.previous_status);
            run.pending_feedback = Some(PendingFeedback {
                feedback: feedback.to_string(),
                decision: decision.clone(),
                previous_status,
            });
            run.session.wait_for_feedback();
            return Ok(FeedbackOutcome::AwaitingApproval { decision });
        }
        Ok(self.apply_decision(run, decision, feedback).await)
    }

    /// Apply a decision someone has approved, whether or not it was parked on this run.
    pub async fn confirm_feedback(
        &self,
        run: &mut WorkflowRun,
        decision: FeedbackDecision,
        feedback: &str,
    ) -> Result<FeedbackOutcome> {
        require_non_empty("feedback", feedback)?;
        Ok(self.apply_decision(run, decision, feedback).await)
    }

    /// Apply the parked decision.
    pub async fn approve_pending(&self, run: &mut WorkflowRun) -> Result<FeedbackOutcome> {
        let pending = run.pending_feedback.take().ok_or_else(|| {
            PmkError::Validation("no feedback is awaiting approval for this session".to_string())
        })?;
        Ok(self.apply_decision(run, pending.decision, &pending.feedback).await)
    }

    /// Drop the parked decision and put the session back where it was.
    pub fn reject_pending(&self, run: &mut WorkflowRun) -> Result<FeedbackOutcome> {
        let pending = run.pending_feedback.take().ok_or_else(|| {
            PmkError::Validation("no feedback is awaiting approval for this session".to_string())
        })?;
        run.session.set_status(pending.previous_status);
        info!(session.id = run.session_id(), "pending feedback rejected");
        Ok(FeedbackOutcome::Rejected { decision: pending.decision })
    }

    async fn apply_decision(
        &self,
        run: &mut WorkflowRun,
        decision: FeedbackDecision,
        feedback: &str,
    ) -> FeedbackOutcome {
        if let Some(parked) = run.pending_feedback.take() {
            info!(
                session.id = run.session_id(),
                superseded = %parked.decision.target_agent,
                "parked feedback superseded"
            );
        }
        let step = match &decision.target_agent {
            RoutingTarget::Proceed => {
                run.settle();
                return FeedbackOutcome::NoChange { decision };
            }
            RoutingTarget::Unknown(target) => {
                let error = PmkError::UnknownRoutingTarget {
                    target: target.clone(),
                    reasoning: decision.reasoning.clone(),
                };
                warn!(session.id = run.session_id(), error = %error, "feedback not routed");
                run.settle();
                return FeedbackOutcome::Unrouted { message: error.to_string(), decision };
            }
            RoutingTarget::Agent(kind) => kind.workflow_step(),
        };
        let Some(step) = step.filter(|s| run.request.is_enabled(*s)) else {
            run.settle();
            let message = format!(
                "{} is not enabled for this workflow; feedback left unapplied",
                decision.target_agent
            );
            return FeedbackOutcome::Unrouted { decision, message };
        };

        // A step cannot re-run ahead of an earlier failure; its inputs do not exist.
        let start = match &run.failure {
            Some(failure) if failure.step < step => failure.step,
            _ => step,
        };
        run.failure = None;
        let span = workflow_run_span(run.session_id());
        async {
            info!(routed_to = %step, start = %start, "re-running workflow from feedback");
            self.execute_from(run, start, Some(StepFeedback { step, text: feedback })).await;
        }
        .instrument(span)
        .await;
        FeedbackOutcome::Rerun { decision, step }
    }

    async fn execute_from(
        &self,
        run: &mut WorkflowRun,
        start: WorkflowStep,
        feedback: Option<StepFeedback<'_>>,
    ) {
        for step in start.and_following() {
            if !run.request.is_enabled(step) {
                run.session.skip_step(step);
                info!(step = %step, "step skipped");
                continue;
            }
            run.session.begin_step(step);
            let span = step_span(step.as_str(), run.session_id());
            let feedback = feedback.filter(|f| f.step == step).map(|f| f.text);
            match self.run_step(run, step, feedback).instrument(span).await {
                Ok(usage) => {
                    run.usage.insert(step, usage);
                    run.session.complete_step(step);
                    info!(
                        step = %step,
                        completion = run.session.quality_metrics.completion_percentage,
                        "step completed"
                    );
                }
                Err(error) => {
                    warn!(step = %step, error = %error, kind = error.kind(), "step failed");
                    run.record_failure(step, &error);
                    return;
                }
            }
        }
        run.session.finish();
    }

    /// Run one step against the artifacts already on `run`, storing its output there.
    async fn run_step(
        &self,
        run: &mut WorkflowRun,
        step: WorkflowStep,
        feedback: Option<&str>,
    ) -> Result<UsageMetadata> {
        let ctx = &self.ctx;
        let additional_context = merge_context(run.request.additional_context.as_deref(), feedback);
        match step {
            WorkflowStep::Idea => {
                let input = IdeaInput::new(run.request.raw_idea.clone())
                    .with_context(additional_context);
                let output = refine_idea(ctx, input).await?;
                Ok(store(output, &mut run.idea_analysis))
            }
            WorkflowStep::UserStories => {
                let idea = upstream(&run.idea_analysis, step, "idea analysis")?;
                let input = UserStoryInput {
                    refined_idea: idea.refined_idea.clone(),
                    personas: idea.personas.clone(),
                    additional_context,
                };
                let output = generate_user_stories(ctx, input).await?;
                Ok(store(output, &mut run.user_story_analysis))
            }
            WorkflowStep::Prd => {
                let idea = upstream(&run.idea_analysis, step, "idea analysis")?;
                let stories = upstream(&run.user_story_analysis, step, "user stories")?;
                let input = PrdInput {
                    refined_idea: idea.refined_idea.clone(),
                    user_stories: stories.user_stories.clone(),
                    additional_context,
                    publish_to_notion: run.request.publish_prd_to_notion,
                };
                let output = write_prd(ctx, input).await?;
                Ok(store(output, &mut run.prd_analysis))
            }
            WorkflowStep::SprintPlanning => {
                let stories = upstream(&run.user_story_analysis, step, "user stories")?;
                let input = SprintInput {
                    user_stories: stories.user_stories.clone(),
                    team_size: run.request.team_size,
                    sprint_length: run.request.sprint_length,
                    total_sprints: run.request.total_sprints,
                    create_linear_project: run.request.create_linear_project,
                    additional_context,
                };
                let output = plan_sprints(ctx, input).await?;
                Ok(store(output, &mut run.sprint_analysis))
            }
            WorkflowStep::VisualDesign => {
                let idea = upstream(&run.idea_analysis, step, "idea analysis")?;
                let stories = upstream(&run.user_story_analysis, step, "user stories")?;
                let input = VisualInput {
                    refined_idea: idea.refined_idea.clone(),
                    personas: idea.personas.clone(),
                    user_stories: stories.user_stories.clone(),
                    create_miro_board: run.request.create_miro_board,
                    additional_context,
                };
                let output = design_visuals(ctx, input).await?;
                Ok(store(output, &mut run.visual_analysis))
            }
            WorkflowStep::Idle | WorkflowStep::Done => Ok(UsageMetadata::default()),
        }
    }
}

fn store<T>(output: StepOutput<T>, slot: &mut Option<T>) -> UsageMetadata {
    *slot = Some(output.value);
    output.usage
}

fn upstream<'a, T>(artifact: &'a Option<T>, step: WorkflowStep, what: &str) -> Result<&'a T> {
    artifact.as_ref().ok_or_else(|| {
        PmkError::DataIntegrity(format!(
            "{step} needs the {what}, which this session does not have"
        ))
    })
}

fn merge_context(base: Option<&str>, feedback: Option<&str>) -> Option<String> {
    match (base.filter(|b| !b.trim().is_empty()), feedback) {
        (Some(base), Some(feedback)) => {
            Some(format!("{base}\n\nFeedback to address:\n{feedback}"))
        }
        (None, Some(feedback)) => Some(format!("Feedback to address:\n{feedback}")),
        (base, None) => base.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_context() {
        assert_eq!(merge_context(None, None), None);
        assert_eq!(merge_context(Some("B2B"), None).as_deref(), Some("B2B"));
        assert_eq!(
            merge_context(Some(" "), Some("more detail")).as_deref(),
            Some("Feedback to address:\nmore detail")
        );
        let merged = merge_context(Some("B2B"), Some("more detail")).unwrap();
        assert!(merged.starts_with("B2B\n\n"));
        assert!(merged.ends_with("more detail"));
    }

    #[test]
    fn test_upstream_missing_is_integrity_error() {
        let missing: Option<u32> = None;
        let err = upstream(&missing, WorkflowStep::Prd, "user stories").unwrap_err();
        assert!(matches!(err, PmkError::DataIntegrity(_)));
        assert!(err.to_string().contains("prd needs the user stories"));
    }
}
