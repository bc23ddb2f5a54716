//! # pmk-agent
//!
//! The product-management agents and the workflow that chains them.
//!
//! ## Overview
//!
//! - [`steps`] - The five step functions: idea, user stories, PRD, sprint plan, visual design
//! - [`route_feedback`] - Classify feedback onto the step that should act on it
//! - [`ConversationalWorkflow`] - Run the steps in order and re-run them on feedback
//! - [`StructuredGenerator`] - Schema-validated model output with a bounded repair retry
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pmk_agent::{AgentContext, ConversationalWorkflow, WorkflowRequest};
//!
//! let workflow = ConversationalWorkflow::new(AgentContext::new(llm));
//! let run = workflow.run(WorkflowRequest::new("A habit tracker for remote teams")).await?;
//! println!("{}%", run.session.quality_metrics.completion_percentage);
//! ```

pub mod context;
pub mod feedback;
pub mod prompts;
pub mod schema;
pub mod settings;
pub mod steps;
pub mod structured;
pub mod workflow;

pub use context::AgentContext;
pub use feedback::{FeedbackInput, route_feedback};
pub use schema::{OutputSchema, generate_gemini_schema};
pub use settings::AgentSettings;
pub use steps::{
    IdeaInput, PrdInput, SprintInput, UserStoryInput, VisualInput, design_visuals,
    generate_user_stories, plan_sprints, refine_idea, write_prd,
};
pub use structured::{StepOutput, StructuredGenerator, strip_code_fence};
pub use workflow::{
    ConversationalWorkflow, FeedbackOutcome, PendingFeedback, StepFailure, WorkflowRequest,
    WorkflowRun,
};
