//! Best-effort batch execution.

use futures::StreamExt;
use pmk_core::{BatchOutcome, Result};
use std::future::Future;

/// Run `op` over every item with at most `concurrency` calls in flight.
///
/// Results keep input order. A failing item is recorded in the outcome and never cancels
/// the others. A concurrency of 0 is treated as 1.
pub async fn run_best_effort<I, T, F, Fut>(
    items: Vec<I>,
    concurrency: usize,
    op: F,
) -> BatchOutcome<I, T>
where
    I: Clone,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let results: Vec<(I, Result<T>)> = futures::stream::iter(items)
        .map(|item| {
            let call = op(item.clone());
            async move { (item, call.await) }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut outcome = BatchOutcome::new();
    for (item, result) in results {
        match result {
            Ok(value) => outcome.push_success(value),
            Err(error) => {
                tracing::warn!(error = %error, "batch item failed");
                outcome.push_failure(item, error);
            }
        }
    }
    outcome
}
