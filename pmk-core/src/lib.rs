//! # pmk-core
//!
//! Core types for the product-management kit.
//!
//! ## Overview
//!
//! - [`Llm`] - The model-invocation contract every agent step is built on
//! - Product artifacts: [`RefinedIdea`], [`UserStory`], [`PrdDocument`], [`SprintPlan`],
//!   [`VisualAnalysis`]
//! - [`WorkflowSession`] / [`QualityMetrics`] - Run state of the conversational workflow
//! - [`FeedbackDecision`] - Output of the feedback router
//! - [`BatchOutcome`] - Result of best-effort batch operations
//! - [`PmkError`] / [`Result`] - Unified error handling

pub mod artifacts;
pub mod batch;
pub mod error;
pub mod feedback;
pub mod model;
pub mod session;
pub mod sprint;
pub mod types;
pub mod visual;

pub use artifacts::{
    Feature, IdeaAnalysis, PrdAnalysis, PrdDocument, Priority, PublishedPage, RefinedIdea,
    Requirement, UserPersona, UserStory, UserStoryAnalysis,
};
pub use batch::{BatchOutcome, FailedItem, ItemError};
pub use error::{PmkError, Result, Vendor, require_non_empty};
pub use feedback::{AgentKind, FeedbackDecision, RoutingTarget};
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, ToolCall, UsageMetadata,
};
pub use session::{QualityMetrics, SessionStatus, StepStatus, WorkflowSession, WorkflowStep};
pub use sprint::{
    ExternalCycle, ExternalIssue, LinearIntegration, Sprint, SprintAssignment, SprintLength,
    SprintPlan,
};
pub use types::{Content, Part};
pub use visual::{
    DesignPlan, ElementCount, FlowStep, JourneyStage, MiroIntegration, PersonaCard, VisualAnalysis,
    VisualBoard,
};
