//! `pmk run` and `pmk feedback`: one workflow run kept in a JSON file.

use crate::cli::{FeedbackArgs, RunArgs};
use anyhow::{Context, Result};
use pmk_agent::{ConversationalWorkflow, FeedbackOutcome, WorkflowRequest, WorkflowRun};
use std::io::Write;
use std::path::Path;

pub fn request_from_args(args: &RunArgs) -> WorkflowRequest {
    let mut request = WorkflowRequest::new(args.idea.clone())
        .with_team(args.team_size, args.sprint_length, args.total_sprints)
        .with_sprint_planning(!args.no_sprints)
        .with_visual_design(!args.no_visual)
        .with_linear_project(args.linear)
        .with_miro_board(args.miro)
        .with_notion_publishing(args.notion);
    if let Some(context) = &args.context {
        request = request.with_context(context.clone());
    }
    if let Some(session_id) = &args.session_id {
        request = request.with_session_id(session_id.clone());
    }
    request
}

/// Run the workflow and write the run to `--output` or stdout.
///
/// A step failure is recorded on the returned run, not returned as an error.
pub async fn run_workflow(
    workflow: &ConversationalWorkflow,
    args: &RunArgs,
) -> Result<WorkflowRun> {
    let run = workflow.run(request_from_args(args)).await?;
    match &args.output {
        Some(path) => write_run(path, &run)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &run)?;
            writeln!(stdout)?;
        }
    }
    Ok(run)
}

/// Apply feedback to the run stored at `args.run` and save it back.
pub async fn apply_feedback(
    workflow: &ConversationalWorkflow,
    args: &FeedbackArgs,
) -> Result<FeedbackOutcome> {
    let mut run = read_run(&args.run)?;
    let outcome = if args.approve {
        workflow.approve_pending(&mut run).await?
    } else if args.reject {
        workflow.reject_pending(&mut run)?
    } else {
        let text = args.text.as_deref().unwrap_or_default();
        workflow.handle_feedback(&mut run, text).await?
    };
    write_run(&args.run, &run)?;
    Ok(outcome)
}

/// One-line status for the terminal.
pub fn summarize(run: &WorkflowRun) -> String {
    let metrics = &run.session.quality_metrics;
    let mut line = format!(
        "session {}: {:?}, {}% complete",
        run.session_id(),
        run.session.status,
        metrics.completion_percentage
    );
    if let Some(failure) = &run.failure {
        line.push_str(&format!(", stopped at {} ({})", failure.step, failure.message));
    }
    if run.pending_feedback.is_some() {
        line.push_str(", feedback awaiting approval");
    }
    line
}

pub fn read_run(path: &Path) -> Result<WorkflowRun> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a saved run", path.display()))
}

pub fn write_run(path: &Path, run: &WorkflowRun) -> Result<()> {
    let json = serde_json::to_string_pretty(run)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run file {}", path.display()))
}
