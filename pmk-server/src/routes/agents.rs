//! One POST route per agent.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Response;
use pmk_agent::{
    FeedbackInput, IdeaInput, PrdInput, SprintInput, UserStoryInput, VisualInput, design_visuals,
    generate_user_stories, plan_sprints, refine_idea, route_feedback, write_prd,
};
use pmk_core::{AgentKind, RefinedIdea, SprintLength, UserPersona, UserStory};
use serde::Deserialize;
use serde_json::Value;

type Body<T> = std::result::Result<Json<T>, JsonRejection>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeaRequest {
    #[serde(alias = "productIdea")]
    pub message: String,
    #[serde(alias = "additionalContext")]
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStoryRequest {
    pub refined_idea: Option<RefinedIdea>,
    pub product_idea: Option<String>,
    pub personas: Vec<UserPersona>,
    #[serde(alias = "additionalContext")]
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrdRequest {
    pub refined_idea: Option<RefinedIdea>,
    pub product_idea: Option<String>,
    pub user_stories: Vec<UserStory>,
    pub publish_to_notion: bool,
    #[serde(alias = "additionalContext")]
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SprintRequest {
    pub user_stories: Vec<UserStory>,
    pub team_size: u32,
    pub sprint_length: SprintLength,
    pub total_sprints: u32,
    pub create_linear_project: bool,
    #[serde(alias = "additionalContext")]
    pub context: Option<String>,
    pub session_id: Option<String>,
}

impl Default for SprintRequest {
    fn default() -> Self {
        Self {
            user_stories: Vec::new(),
            team_size: 5,
            sprint_length: SprintLength::default(),
            total_sprints: 3,
            create_linear_project: false,
            context: None,
            session_id: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualRequest {
    pub refined_idea: Option<RefinedIdea>,
    pub product_idea: Option<String>,
    pub personas: Vec<UserPersona>,
    pub user_stories: Vec<UserStory>,
    pub create_miro_board: bool,
    #[serde(alias = "additionalContext")]
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackRequest {
    #[serde(alias = "feedback")]
    pub message: String,
    /// Current workflow artifacts.
    pub context: Value,
    pub session_id: Option<String>,
}

/// The refined idea, or a stand-in built from a free-text product idea.
fn idea_from(refined: Option<RefinedIdea>, product_idea: Option<String>) -> Option<RefinedIdea> {
    refined.or_else(|| {
        product_idea.filter(|p| !p.trim().is_empty()).map(|p| RefinedIdea::from_description(&p))
    })
}

const IDEA_REQUIRED: &str = "Product idea is required";

pub async fn idea_generation(State(state): State<AppState>, body: Body<IdeaRequest>) -> Response {
    let agent = AgentKind::IdeaGeneration.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    if req.message.trim().is_empty() {
        return responder.fail(StatusCode::BAD_REQUEST, "Message is required");
    }
    let input = IdeaInput::new(req.message).with_context(req.context);
    match refine_idea(&state.context, input).await {
        Ok(output) => responder.step(output),
        Err(e) => responder.error(e),
    }
}

pub async fn user_story(State(state): State<AppState>, body: Body<UserStoryRequest>) -> Response {
    let agent = AgentKind::UserStory.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    let Some(refined_idea) = idea_from(req.refined_idea, req.product_idea) else {
        return responder.fail(StatusCode::BAD_REQUEST, IDEA_REQUIRED);
    };
    let input =
        UserStoryInput { refined_idea, personas: req.personas, additional_context: req.context };
    match generate_user_stories(&state.context, input).await {
        Ok(output) => responder.step(output),
        Err(e) => responder.error(e),
    }
}

pub async fn prd(State(state): State<AppState>, body: Body<PrdRequest>) -> Response {
    let agent = AgentKind::Prd.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    let Some(refined_idea) = idea_from(req.refined_idea, req.product_idea) else {
        return responder.fail(StatusCode::BAD_REQUEST, IDEA_REQUIRED);
    };
    if req.user_stories.is_empty() {
        return responder.fail(StatusCode::BAD_REQUEST, "User stories are required");
    }
    let input = PrdInput {
        refined_idea,
        user_stories: req.user_stories,
        additional_context: req.context,
        publish_to_notion: req.publish_to_notion,
    };
    match write_prd(&state.context, input).await {
        Ok(output) => responder.step(output),
        Err(e) => responder.error(e),
    }
}

pub async fn sprint_planner(State(state): State<AppState>, body: Body<SprintRequest>) -> Response {
    let agent = AgentKind::SprintPlanner.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    if req.user_stories.is_empty() {
        return responder.fail(StatusCode::BAD_REQUEST, "User stories are required");
    }
    let input = SprintInput {
        user_stories: req.user_stories,
        team_size: req.team_size,
        sprint_length: req.sprint_length,
        total_sprints: req.total_sprints,
        create_linear_project: req.create_linear_project,
        additional_context: req.context,
    };
    match plan_sprints(&state.context, input).await {
        Ok(output) => responder.step(output),
        Err(e) => responder.error(e),
    }
}

pub async fn visual_design(State(state): State<AppState>, body: Body<VisualRequest>) -> Response {
    let agent = AgentKind::VisualDesign.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    let Some(refined_idea) = idea_from(req.refined_idea, req.product_idea) else {
        return responder.fail(StatusCode::BAD_REQUEST, IDEA_REQUIRED);
    };
    let input = VisualInput {
        refined_idea,
        personas: req.personas,
        user_stories: req.user_stories,
        create_miro_board: req.create_miro_board,
        additional_context: req.context,
    };
    match design_visuals(&state.context, input).await {
        Ok(output) => responder.step(output),
        Err(e) => responder.error(e),
    }
}

pub async fn feedback(State(state): State<AppState>, body: Body<FeedbackRequest>) -> Response {
    let agent = AgentKind::Feedback.as_str();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return state.responder(agent, None).rejection(rejection),
    };
    let responder = state.responder(agent, req.session_id);
    if req.message.trim().is_empty() {
        return responder.fail(StatusCode::BAD_REQUEST, "Feedback is required");
    }
    let input = FeedbackInput { feedback: req.message, context: req.context };
    match route_feedback(&state.context, input).await {
        Ok(output) => {
            let confidence = output.value.confidence;
            responder.step_with_confidence(output, confidence)
        }
        Err(e) => responder.error(e),
    }
}
