//! Agent identities and feedback routing decisions.

use crate::session::WorkflowStep;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The agents exposed over HTTP; the string form is the route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    IdeaGeneration,
    UserStory,
    Prd,
    SprintPlanner,
    VisualDesign,
    Feedback,
}

impl AgentKind {
    /// Agents the feedback router may send work back to, in workflow order.
    pub const ROUTABLE: [AgentKind; 5] = [
        AgentKind::IdeaGeneration,
        AgentKind::UserStory,
        AgentKind::Prd,
        AgentKind::SprintPlanner,
        AgentKind::VisualDesign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::IdeaGeneration => "idea-generation",
            AgentKind::UserStory => "user-story",
            AgentKind::Prd => "prd",
            AgentKind::SprintPlanner => "sprint-planner",
            AgentKind::VisualDesign => "visual-design",
            AgentKind::Feedback => "feedback",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ROUTABLE
            .into_iter()
            .chain(std::iter::once(AgentKind::Feedback))
            .find(|kind| kind.as_str() == normalized)
    }

    /// Workflow step this agent produces, if it is one of the five steps.
    pub fn workflow_step(&self) -> Option<WorkflowStep> {
        match self {
            AgentKind::IdeaGeneration => Some(WorkflowStep::Idea),
            AgentKind::UserStory => Some(WorkflowStep::UserStories),
            AgentKind::Prd => Some(WorkflowStep::Prd),
            AgentKind::SprintPlanner => Some(WorkflowStep::SprintPlanning),
            AgentKind::VisualDesign => Some(WorkflowStep::VisualDesign),
            AgentKind::Feedback => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the router wants the workflow to go next.
///
/// The model is constrained to a fixed enumeration, but whatever string comes back is
/// kept: anything outside the enumeration lands in `Unknown` for manual handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoutingTarget {
    Agent(AgentKind),
    Proceed,
    Unknown(String),
}

impl RoutingTarget {
    /// Values offered to the model.
    pub fn allowed_values() -> Vec<&'static str> {
        AgentKind::ROUTABLE.iter().map(AgentKind::as_str).chain(std::iter::once("none")).collect()
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RoutingTarget::Unknown(_))
    }

    pub fn agent(&self) -> Option<AgentKind> {
        match self {
            RoutingTarget::Agent(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for RoutingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingTarget::Agent(kind) => f.write_str(kind.as_str()),
            RoutingTarget::Proceed => f.write_str("none"),
            RoutingTarget::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl From<String> for RoutingTarget {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "proceed" | "" => RoutingTarget::Proceed,
            other => match AgentKind::from_name(other) {
                Some(kind) if kind != AgentKind::Feedback => RoutingTarget::Agent(kind),
                _ => RoutingTarget::Unknown(value),
            },
        }
    }
}

impl From<RoutingTarget> for String {
    fn from(value: RoutingTarget) -> Self {
        match value {
            RoutingTarget::Unknown(raw) => raw,
            known => known.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDecision {
    pub target_agent: RoutingTarget,
    pub confidence: f64,
    pub reasoning: String,
    pub suggested_action: String,
    pub requires_approval: bool,
}
