use super::request::WorkflowRequest;
use pmk_core::{
    FeedbackDecision, IdeaAnalysis, PmkError, PrdAnalysis, SessionStatus, SprintPlan,
    UsageMetadata, UserStoryAnalysis, VisualAnalysis, WorkflowSession, WorkflowStep,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
    pub step: WorkflowStep,
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl StepFailure {
    pub fn new(step: WorkflowStep, error: &PmkError) -> Self {
        Self {
            step,
            kind: error.kind().to_string(),
            message: error.to_string(),
            raw_response: error.raw_response().map(str::to_string),
        }
    }
}

/// Feedback held back until someone approves the router's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFeedback {
    pub feedback: String,
    pub decision: FeedbackDecision,
    pub previous_status: SessionStatus,
}

/// What handling a piece of feedback did to the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FeedbackOutcome {
    AwaitingApproval { decision: FeedbackDecision },
    Rerun { decision: FeedbackDecision, step: WorkflowStep },
    NoChange { decision: FeedbackDecision },
    Unrouted { decision: FeedbackDecision, message: String },
    Rejected { decision: FeedbackDecision },
}

impl FeedbackOutcome {
    pub fn decision(&self) -> &FeedbackDecision {
        match self {
            FeedbackOutcome::AwaitingApproval { decision }
            | FeedbackOutcome::Rerun { decision, .. }
            | FeedbackOutcome::NoChange { decision }
            | FeedbackOutcome::Unrouted { decision, .. }
            | FeedbackOutcome::Rejected { decision } => decision,
        }
    }
}

/// One workflow execution: the session plus every artifact produced so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub session: WorkflowSession,
    pub request: WorkflowRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_analysis: Option<IdeaAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_story_analysis: Option<UserStoryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prd_analysis: Option<PrdAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_analysis: Option<SprintPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_analysis: Option<VisualAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    #[serde(default)]
    pub usage: BTreeMap<WorkflowStep, UsageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_feedback: Option<PendingFeedback>,
}

impl WorkflowRun {
    pub fn new(request: WorkflowRequest) -> Self {
        Self {
            session: WorkflowSession::new(request.session_id.clone()),
            request,
            idea_analysis: None,
            user_story_analysis: None,
            prd_analysis: None,
            sprint_analysis: None,
            visual_analysis: None,
            failure: None,
            usage: BTreeMap::new(),
            pending_feedback: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    pub fn total_usage(&self) -> UsageMetadata {
        self.usage.values().fold(UsageMetadata::default(), |acc, u| acc.merge(*u))
    }

    /// The artifacts as one JSON object, for the feedback router.
    pub fn artifacts_snapshot(&self) -> Value {
        json!({
            "ideaAnalysis": self.idea_analysis,
            "userStoryAnalysis": self.user_story_analysis,
            "prdAnalysis": self.prd_analysis,
            "sprintAnalysis": self.sprint_analysis,
            "visualAnalysis": self.visual_analysis,
        })
    }

    /// Record a step failure and drop whatever the failed and later steps had produced.
    pub(crate) fn record_failure(&mut self, step: WorkflowStep, error: &PmkError) {
        self.failure = Some(StepFailure::new(step, error));
        self.session.fail_step(step);
        self.session.clear_steps_after(step);
        for later in step.and_following() {
            self.discard(later);
        }
    }

    fn discard(&mut self, step: WorkflowStep) {
        match step {
            WorkflowStep::Idea => self.idea_analysis = None,
            WorkflowStep::UserStories => self.user_story_analysis = None,
            WorkflowStep::Prd => self.prd_analysis = None,
            WorkflowStep::SprintPlanning => self.sprint_analysis = None,
            WorkflowStep::VisualDesign => self.visual_analysis = None,
            WorkflowStep::Idle | WorkflowStep::Done => {}
        }
        self.usage.remove(&step);
    }

    /// Status to return to once feedback has been dealt with without re-running anything.
    pub(crate) fn settle(&mut self) {
        let status =
            if self.failure.is_some() { SessionStatus::Failed } else { SessionStatus::Completed };
        self.session.set_status(status);
    }
}
