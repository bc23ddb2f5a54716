mod common;

use common::*;
use pmk_agent::{
    ConversationalWorkflow, FeedbackInput, FeedbackOutcome, WorkflowRequest, WorkflowRun,
    route_feedback,
};
use pmk_core::{AgentKind, PmkError, RoutingTarget, SessionStatus, WorkflowStep};
use pmk_model::MockLlm;
use serde_json::json;
use std::sync::Arc;

async fn completed_run(script: &Script) -> (ConversationalWorkflow, Arc<MockLlm>, WorkflowRun) {
    let llm = script.llm();
    let workflow = ConversationalWorkflow::new(context(llm.clone()));
    let run = workflow.run(WorkflowRequest::new("Pulse")).await.unwrap();
    assert_eq!(run.session.status, SessionStatus::Completed);
    (workflow, llm, run)
}

#[tokio::test]
async fn test_router_offers_enumerated_targets() {
    let llm = Arc::new(MockLlm::new("mock").with_json(feedback_reply("prd", false)));
    let ctx = context(llm.clone());

    let output = route_feedback(
        &ctx,
        FeedbackInput { feedback: "Add success metrics".into(), context: json!({"prd": {}}) },
    )
    .await
    .unwrap();

    assert_eq!(output.value.target_agent, RoutingTarget::Agent(AgentKind::Prd));
    let requests = llm.requests().await;
    let request = &requests[0];
    let schema = request.config.as_ref().unwrap().response_schema.as_ref().unwrap();
    let offered = schema["properties"]["targetAgent"]["enum"].as_array().unwrap();
    assert_eq!(offered.len(), 6);
    assert!(offered.contains(&json!("none")));
    assert!(request.prompt_text().contains("Add success metrics"));
}

#[tokio::test]
async fn test_router_keeps_unknown_target() {
    let llm = Arc::new(MockLlm::new("mock").with_json(feedback_reply("pricing-team", true)));

    let output = route_feedback(
        &context(llm),
        FeedbackInput { feedback: "Too expensive".into(), context: json!(null) },
    )
    .await
    .unwrap();

    assert_eq!(output.value.target_agent, RoutingTarget::Unknown("pricing-team".into()));
    assert!(output.value.requires_approval);
}

#[tokio::test]
async fn test_router_rejects_out_of_range_confidence() {
    let mut reply = feedback_reply("prd", false);
    reply["confidence"] = json!(1.5);
    let llm = Arc::new(MockLlm::new("mock").with_json(reply.clone()).with_json(reply));

    let err = route_feedback(
        &context(llm.clone()),
        FeedbackInput { feedback: "More detail".into(), context: json!({}) },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PmkError::MalformedAgentResponse { .. }));
    assert!(err.to_string().contains("confidence must be between 0 and 1"));
    assert_eq!(llm.call_count().await, 2);
}

#[tokio::test]
async fn test_router_requires_feedback_text() {
    let llm = Arc::new(MockLlm::new("mock"));
    let input = FeedbackInput { feedback: " ".into(), context: json!({}) };
    let err = route_feedback(&context(llm), input).await.unwrap_err();
    assert_eq!(err.to_string(), "feedback is required");
}

#[tokio::test]
async fn test_direct_feedback_reruns_target_and_downstream() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("user-story", false));

    let outcome = workflow.handle_feedback(&mut run, "Add an offline mode story").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rerun { step: WorkflowStep::UserStories, .. }));
    assert_eq!(run.session.status, SessionStatus::Completed);
    assert_eq!(run.session.quality_metrics.completion_percentage, 100);
    assert_eq!(requests_for(&llm, IDEA).await.len(), 1);
    for agent in [STORIES, PRD, SPRINT, VISUAL] {
        assert_eq!(requests_for(&llm, agent).await.len(), 2, "{agent} should re-run once");
    }
    let story_prompt = requests_for(&llm, STORIES).await[1].prompt_text();
    assert!(story_prompt.contains("Feedback to address:\nAdd an offline mode story"));
    let prd_prompt = requests_for(&llm, PRD).await[1].prompt_text();
    assert!(!prd_prompt.contains("offline mode"));
}

#[tokio::test]
async fn test_feedback_needing_approval_waits() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("prd", true));

    let outcome = workflow.handle_feedback(&mut run, "Rewrite the goals").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::AwaitingApproval { .. }));
    assert_eq!(run.session.status, SessionStatus::WaitingForFeedback);
    assert_eq!(run.pending_feedback.as_ref().unwrap().feedback, "Rewrite the goals");
    assert_eq!(requests_for(&llm, PRD).await.len(), 1);

    let outcome = workflow.approve_pending(&mut run).await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rerun { step: WorkflowStep::Prd, .. }));
    assert!(run.pending_feedback.is_none());
    assert_eq!(run.session.status, SessionStatus::Completed);
    assert_eq!(requests_for(&llm, PRD).await.len(), 2);
    assert_eq!(requests_for(&llm, STORIES).await.len(), 1);
}

#[tokio::test]
async fn test_rejecting_pending_feedback_restores_status() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("idea-generation", true));
    workflow.handle_feedback(&mut run, "Pivot to B2C").await.unwrap();
    let calls = llm.call_count().await;

    let outcome = workflow.reject_pending(&mut run).unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rejected { .. }));
    assert_eq!(run.session.status, SessionStatus::Completed);
    assert_eq!(llm.call_count().await, calls);
    assert!(matches!(workflow.approve_pending(&mut run).await, Err(PmkError::Validation(_))));
}

#[tokio::test]
async fn test_direct_feedback_supersedes_parked_decision() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("idea-generation", true));
    workflow.handle_feedback(&mut run, "Pivot to B2C").await.unwrap();
    assert!(run.pending_feedback.is_some());

    script.set_json(FEEDBACK, feedback_reply("prd", false));
    let outcome = workflow.handle_feedback(&mut run, "Add success metrics").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rerun { step: WorkflowStep::Prd, .. }));
    assert!(run.pending_feedback.is_none());
    assert_eq!(run.session.status, SessionStatus::Completed);
    let calls = llm.call_count().await;
    assert!(matches!(workflow.approve_pending(&mut run).await, Err(PmkError::Validation(_))));
    assert_eq!(llm.call_count().await, calls);
    assert_eq!(requests_for(&llm, IDEA).await.len(), 1);
}

#[tokio::test]
async fn test_second_parked_decision_keeps_original_status() {
    let script = Script::new();
    let (workflow, _llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("idea-generation", true));
    workflow.handle_feedback(&mut run, "Pivot to B2C").await.unwrap();
    script.set_json(FEEDBACK, feedback_reply("prd", true));
    workflow.handle_feedback(&mut run, "Rewrite the goals").await.unwrap();

    assert_eq!(run.pending_feedback.as_ref().unwrap().feedback, "Rewrite the goals");
    workflow.reject_pending(&mut run).unwrap();
    assert_eq!(run.session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_confirm_feedback_applies_given_decision() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    let decision = serde_json::from_value(feedback_reply("visual-design", false)).unwrap();

    let outcome = workflow.confirm_feedback(&mut run, decision, "Use brand colours").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rerun { step: WorkflowStep::VisualDesign, .. }));
    assert_eq!(requests_for(&llm, VISUAL).await.len(), 2);
    assert_eq!(requests_for(&llm, SPRINT).await.len(), 1);
    assert!(requests_for(&llm, FEEDBACK).await.is_empty());
}

#[tokio::test]
async fn test_unknown_target_is_surfaced_not_applied() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;
    script.set_json(FEEDBACK, feedback_reply("pricing-team", false));
    let before = run.clone();

    let outcome = workflow.handle_feedback(&mut run, "Lower the price").await.unwrap();

    match outcome {
        FeedbackOutcome::Unrouted { message, decision } => {
            assert!(message.contains("pricing-team"));
            assert_eq!(decision.reasoning, "the feedback concerns pricing-team");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(run.session.status, SessionStatus::Completed);
    assert_eq!(run.prd_analysis, before.prd_analysis);
    assert_eq!(llm.call_count().await, 6);
}

#[tokio::test]
async fn test_proceed_changes_nothing() {
    let script = Script::new();
    let (workflow, llm, mut run) = completed_run(&script).await;

    let outcome = workflow.handle_feedback(&mut run, "Looks great").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::NoChange { .. }));
    assert_eq!(outcome.decision().target_agent, RoutingTarget::Proceed);
    assert_eq!(llm.call_count().await, 6);
}

#[tokio::test]
async fn test_feedback_for_disabled_step_is_unrouted() {
    let script = Script::new();
    let llm = script.llm();
    let workflow = ConversationalWorkflow::new(context(llm.clone()));
    let mut run =
        workflow.run(WorkflowRequest::new("Pulse").with_visual_design(false)).await.unwrap();
    script.set_json(FEEDBACK, feedback_reply("visual-design", false));

    let outcome = workflow.handle_feedback(&mut run, "Add a journey map").await.unwrap();

    match outcome {
        FeedbackOutcome::Unrouted { message, .. } => {
            assert!(message.contains("visual-design is not enabled"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(requests_for(&llm, VISUAL).await.is_empty());
}

#[tokio::test]
async fn test_feedback_after_failure_resumes_from_failed_step() {
    let script = Script::new();
    let mut prd = prd_reply();
    prd["functionalRequirements"][0]["userStoryIds"] = json!(["US-999"]);
    script.set_json(PRD, prd);
    let llm = script.llm();
    let workflow = ConversationalWorkflow::new(context(llm.clone()));
    let mut run = workflow.run(WorkflowRequest::new("Pulse")).await.unwrap();
    assert_eq!(run.failure.as_ref().unwrap().step, WorkflowStep::Prd);

    script.set_json(PRD, prd_reply());
    script.set_json(FEEDBACK, feedback_reply("visual-design", false));
    let outcome = workflow.handle_feedback(&mut run, "Show the onboarding flow").await.unwrap();

    assert!(matches!(outcome, FeedbackOutcome::Rerun { step: WorkflowStep::VisualDesign, .. }));
    assert!(run.failure.is_none());
    assert_eq!(run.session.status, SessionStatus::Completed);
    assert_eq!(run.session.quality_metrics.completion_percentage, 100);
    assert!(run.prd_analysis.is_some());
    let visual_prompt = requests_for(&llm, VISUAL).await[0].prompt_text();
    assert!(visual_prompt.contains("Show the onboarding flow"));
}

#[tokio::test]
async fn test_failed_rerun_discards_downstream_artifacts() {
    let script = Script::new();
    let (workflow, _, mut run) = completed_run(&script).await;
    script.set(STORIES, "{}");
    script.set_json(FEEDBACK, feedback_reply("user-story", false));

    workflow.handle_feedback(&mut run, "Split the dashboard story").await.unwrap();

    assert_eq!(run.session.status, SessionStatus::Failed);
    assert_eq!(run.failure.as_ref().unwrap().step, WorkflowStep::UserStories);
    assert!(run.idea_analysis.is_some());
    assert!(run.user_story_analysis.is_none());
    assert!(run.prd_analysis.is_none());
    assert!(run.visual_analysis.is_none());
    assert!(!run.usage.contains_key(&WorkflowStep::Prd));
    assert_eq!(run.session.quality_metrics.completion_percentage, 20);
}
