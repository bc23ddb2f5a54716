//! The five workflow steps. Each takes a typed input and makes one structured model call
//! (plus bounded repairs), then optionally publishes the result to a vendor.

pub mod idea;
pub mod prd;
pub mod sprint;
pub mod user_story;
pub mod visual;

pub use idea::{IdeaInput, refine_idea};
pub use prd::{PrdInput, write_prd};
pub use sprint::{SprintInput, plan_sprints};
pub use user_story::{UserStoryInput, generate_user_stories};
pub use visual::{VisualInput, design_visuals};

/// Serialize an input fragment for embedding in a prompt.
pub(crate) fn to_prompt_json<T: serde::Serialize>(value: &T) -> pmk_core::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
