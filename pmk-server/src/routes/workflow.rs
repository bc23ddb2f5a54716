//! Whole-workflow routes backed by the in-memory run registry.

use crate::envelope::Responder;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use pmk_agent::{FeedbackOutcome, WorkflowRequest, WorkflowRun};
use pmk_core::FeedbackDecision;
use serde::{Deserialize, Serialize};

const AGENT: &str = "workflow";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowFeedbackRequest {
    #[serde(alias = "feedback")]
    pub message: String,
}

/// Settle feedback parked for approval, or apply a decision supplied by the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmFeedbackRequest {
    pub approve: bool,
    pub decision: Option<FeedbackDecision>,
    pub feedback: Option<String>,
}

impl Default for ConfirmFeedbackRequest {
    fn default() -> Self {
        Self { approve: true, decision: None, feedback: None }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResult {
    #[serde(flatten)]
    pub outcome: FeedbackOutcome,
    pub run: WorkflowRun,
}

#[derive(Debug, Serialize)]
pub struct DeletedRun {
    pub deleted: bool,
}

fn completion(run: &WorkflowRun) -> f64 {
    f64::from(run.session.quality_metrics.completion_percentage) / 100.0
}

pub async fn start(
    State(state): State<AppState>,
    body: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return state.responder(AGENT, None).rejection(rejection),
    };
    let responder = state.responder(AGENT, request.session_id.clone());
    // The run adopts the responder's id so a generated one is reported back.
    let request = request.with_session_id(responder.session_id());
    match state.workflow.run(request).await {
        Ok(run) => {
            let confidence = completion(&run);
            state.registry.insert(run.clone()).await;
            responder.data(run, confidence)
        }
        Err(e) => responder.error(e),
    }
}

pub async fn get_run(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    let responder = state.responder(AGENT, Some(session_id.clone()));
    match state.registry.get(&session_id).await {
        Some(run) => {
            let confidence = completion(&run);
            responder.data(run, confidence)
        }
        None => not_found(&responder),
    }
}

/// Forget a run so its session id can no longer be read or sent feedback.
pub async fn delete_run(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let responder = state.responder(AGENT, Some(session_id.clone()));
    match state.registry.remove(&session_id).await {
        Some(_) => responder.data(DeletedRun { deleted: true }, 1.0),
        None => not_found(&responder),
    }
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<WorkflowFeedbackRequest>, JsonRejection>,
) -> Response {
    let responder = state.responder(AGENT, Some(session_id.clone()));
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return responder.rejection(rejection),
    };
    if req.message.trim().is_empty() {
        return responder.fail(StatusCode::BAD_REQUEST, "Feedback is required");
    }
    let Some(mut run) = state.registry.get(&session_id).await else {
        return not_found(&responder);
    };
    match state.workflow.handle_feedback(&mut run, &req.message).await {
        Ok(outcome) => finish(&state, &responder, outcome, run).await,
        Err(e) => responder.error(e),
    }
}

pub async fn confirm_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<ConfirmFeedbackRequest>, JsonRejection>,
) -> Response {
    let responder = state.responder(AGENT, Some(session_id.clone()));
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return responder.rejection(rejection),
    };
    let Some(mut run) = state.registry.get(&session_id).await else {
        return not_found(&responder);
    };
    let result = match (req.decision, req.feedback) {
        (Some(decision), Some(feedback)) => {
            state.workflow.confirm_feedback(&mut run, decision, &feedback).await
        }
        (Some(_), None) => {
            return responder
                .fail(StatusCode::BAD_REQUEST, "Feedback is required with a decision");
        }
        (None, _) if req.approve => state.workflow.approve_pending(&mut run).await,
        (None, _) => state.workflow.reject_pending(&mut run),
    };
    match result {
        Ok(outcome) => finish(&state, &responder, outcome, run).await,
        Err(e) => responder.error(e),
    }
}

async fn finish(
    state: &AppState,
    responder: &Responder,
    outcome: FeedbackOutcome,
    run: WorkflowRun,
) -> Response {
    let confidence = outcome.decision().confidence;
    state.registry.insert(run.clone()).await;
    responder.data(FeedbackResult { outcome, run }, confidence)
}

fn not_found(responder: &Responder) -> Response {
    responder.fail(
        StatusCode::NOT_FOUND,
        format!("No workflow session {}", responder.session_id()),
    )
}
