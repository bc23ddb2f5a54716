//! Workflow session state and quality metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    Idle,
    Idea,
    UserStories,
    Prd,
    SprintPlanning,
    VisualDesign,
    Done,
}

impl WorkflowStep {
    /// The five producing steps in execution order.
    pub const SEQUENCE: [WorkflowStep; 5] = [
        WorkflowStep::Idea,
        WorkflowStep::UserStories,
        WorkflowStep::Prd,
        WorkflowStep::SprintPlanning,
        WorkflowStep::VisualDesign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Idle => "idle",
            WorkflowStep::Idea => "idea",
            WorkflowStep::UserStories => "user-stories",
            WorkflowStep::Prd => "prd",
            WorkflowStep::SprintPlanning => "sprint-planning",
            WorkflowStep::VisualDesign => "visual-design",
            WorkflowStep::Done => "done",
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, WorkflowStep::SprintPlanning | WorkflowStep::VisualDesign)
    }

    /// Steps from `self` (inclusive) to the end of the sequence.
    pub fn and_following(self) -> impl Iterator<Item = WorkflowStep> {
        WorkflowStep::SEQUENCE.into_iter().skip_while(move |step| *step != self)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Running,
    WaitingForFeedback,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub completion_percentage: u8,
    pub per_step_status: BTreeMap<WorkflowStep, StepStatus>,
}

impl QualityMetrics {
    /// completed / (steps not skipped) × 100, rounded down.
    pub fn recompute(&mut self) {
        let total = WorkflowStep::SEQUENCE.len();
        let skipped = self.count(StepStatus::Skipped);
        let completed = self.count(StepStatus::Completed);
        let denominator = total - skipped;
        self.completion_percentage =
            if denominator == 0 { 100 } else { ((completed * 100) / denominator) as u8 };
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.per_step_status.values().filter(|s| **s == status).count()
    }

    pub fn status_of(&self, step: WorkflowStep) -> Option<StepStatus> {
        self.per_step_status.get(&step).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSession {
    pub session_id: String,
    pub current_step: WorkflowStep,
    pub status: SessionStatus,
    pub quality_metrics: QualityMetrics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSession {
    /// Start a session; a missing or blank id is replaced with a fresh UUID.
    pub fn new(session_id: Option<String>) -> Self {
        let session_id = session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let now = Utc::now();
        Self {
            session_id,
            current_step: WorkflowStep::Idle,
            status: SessionStatus::Running,
            quality_metrics: QualityMetrics::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn begin_step(&mut self, step: WorkflowStep) {
        self.current_step = step;
        self.status = SessionStatus::Running;
        self.touch();
    }

    pub fn complete_step(&mut self, step: WorkflowStep) {
        self.set_step_status(step, StepStatus::Completed);
    }

    pub fn skip_step(&mut self, step: WorkflowStep) {
        self.set_step_status(step, StepStatus::Skipped);
    }

    /// Mark `step` failed and the whole session failed.
    pub fn fail_step(&mut self, step: WorkflowStep) {
        self.current_step = step;
        self.status = SessionStatus::Failed;
        self.set_step_status(step, StepStatus::Failed);
    }

    pub fn finish(&mut self) {
        self.current_step = WorkflowStep::Done;
        self.status = SessionStatus::Completed;
        self.touch();
    }

    pub fn wait_for_feedback(&mut self) {
        self.set_status(SessionStatus::WaitingForFeedback);
    }

    /// Forget the status of every step after `step`.
    pub fn clear_steps_after(&mut self, step: WorkflowStep) {
        self.quality_metrics.per_step_status.retain(|s, _| *s <= step);
        self.quality_metrics.recompute();
        self.touch();
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.touch();
    }

    fn set_step_status(&mut self, step: WorkflowStep, status: StepStatus) {
        self.quality_metrics.per_step_status.insert(step, status);
        self.quality_metrics.recompute();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_generates_id() {
        let session = WorkflowSession::new(None);
        assert!(!session.session_id.is_empty());
        assert_eq!(session.current_step, WorkflowStep::Idle);
        assert_eq!(session.status, SessionStatus::Running);

        let blank = WorkflowSession::new(Some("  ".to_string()));
        assert_ne!(blank.session_id.trim(), "");

        let given = WorkflowSession::new(Some("abc".to_string()));
        assert_eq!(given.session_id, "abc");
    }

    #[test]
    fn test_completion_excludes_skipped_steps() {
        let mut session = WorkflowSession::new(None);
        session.complete_step(WorkflowStep::Idea);
        assert_eq!(session.quality_metrics.completion_percentage, 20);
        session.complete_step(WorkflowStep::UserStories);
        session.complete_step(WorkflowStep::Prd);
        assert_eq!(session.quality_metrics.completion_percentage, 60);
        session.skip_step(WorkflowStep::SprintPlanning);
        session.skip_step(WorkflowStep::VisualDesign);
        assert_eq!(session.quality_metrics.completion_percentage, 100);
    }

    #[test]
    fn test_fail_step_marks_session_failed() {
        let mut session = WorkflowSession::new(None);
        session.complete_step(WorkflowStep::Idea);
        session.fail_step(WorkflowStep::UserStories);
        assert_eq!(session.status, SessionStatus::Failed);
        assert!(session.status.is_terminal());
        assert_eq!(
            session.quality_metrics.status_of(WorkflowStep::UserStories),
            Some(StepStatus::Failed)
        );
        assert_eq!(session.quality_metrics.completion_percentage, 20);
    }

    #[test]
    fn test_metrics_serialize_step_names() {
        let mut session = WorkflowSession::new(Some("s".into()));
        session.skip_step(WorkflowStep::SprintPlanning);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["qualityMetrics"]["perStepStatus"]["sprint-planning"], "skipped");
        assert_eq!(json["currentStep"], "idle");
        assert_eq!(json["status"], "running");
    }

    #[test]
    fn test_clear_steps_after() {
        let mut session = WorkflowSession::new(None);
        for step in WorkflowStep::SEQUENCE {
            session.complete_step(step);
        }
        assert_eq!(session.quality_metrics.completion_percentage, 100);
        session.fail_step(WorkflowStep::Prd);
        session.clear_steps_after(WorkflowStep::Prd);
        assert_eq!(session.quality_metrics.status_of(WorkflowStep::VisualDesign), None);
        assert_eq!(session.quality_metrics.completion_percentage, 40);
    }

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Complete,
        Skip,
        Fail,
    }

    fn outcome() -> impl proptest::strategy::Strategy<Value = Outcome> {
        proptest::prop_oneof![
            3 => proptest::strategy::Just(Outcome::Complete),
            1 => proptest::strategy::Just(Outcome::Skip),
            1 => proptest::strategy::Just(Outcome::Fail),
        ]
    }

    proptest::proptest! {
        #[test]
        fn prop_completion_never_decreases_within_a_run(
            outcomes in proptest::collection::vec(outcome(), 5),
        ) {
            let mut session = WorkflowSession::new(None);
            let mut seen = vec![session.quality_metrics.completion_percentage];
            for (step, outcome) in WorkflowStep::SEQUENCE.into_iter().zip(outcomes) {
                session.begin_step(step);
                seen.push(session.quality_metrics.completion_percentage);
                match outcome {
                    Outcome::Skip if step.is_optional() => session.skip_step(step),
                    Outcome::Fail => session.fail_step(step),
                    _ => session.complete_step(step),
                }
                seen.push(session.quality_metrics.completion_percentage);
                if matches!(outcome, Outcome::Fail) {
                    break;
                }
            }
            if session.status != SessionStatus::Failed {
                session.finish();
                proptest::prop_assert_eq!(session.quality_metrics.completion_percentage, 100);
            }
            proptest::prop_assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
        }
    }

    #[test]
    fn test_and_following() {
        let rest: Vec<_> = WorkflowStep::Prd.and_following().collect();
        assert_eq!(
            rest,
            vec![WorkflowStep::Prd, WorkflowStep::SprintPlanning, WorkflowStep::VisualDesign]
        );
    }
}
