//! Span helpers for common PMK operations

use tracing::Span;

/// Span covering one whole workflow run.
///
/// # Example
/// ```
/// use pmk_telemetry::workflow_run_span;
/// let span = workflow_run_span("session-123");
/// let _enter = span.enter();
/// ```
pub fn workflow_run_span(session_id: &str) -> Span {
    tracing::info_span!("workflow.run", session.id = session_id)
}

/// Span for one workflow step inside a run.
pub fn step_span(step: &str, session_id: &str) -> Span {
    tracing::info_span!("workflow.step", workflow.step = step, session.id = session_id)
}

/// Span for a model API call made on behalf of `agent`.
pub fn model_call_span(model_name: &str, agent: &str) -> Span {
    tracing::info_span!(
        "model.call",
        model.name = model_name,
        agent = agent,
        attempt = tracing::field::Empty
    )
}

/// Span for a call to an external vendor API.
///
/// # Example
/// ```
/// use pmk_telemetry::vendor_call_span;
/// let span = vendor_call_span("Linear", "issueCreate");
/// let _enter = span.enter();
/// ```
pub fn vendor_call_span(vendor: &str, operation: &str) -> Span {
    tracing::debug_span!("vendor.call", vendor = vendor, operation = operation)
}
