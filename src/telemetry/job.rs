//! Job execution span helpers.
//!
//! Provides span creation and outcome recording for job runs flowing
//! through the scheduler.

use tracing::Span;
use uuid::Uuid;

/// Start a span for a job run.
///
/// The `job.outcome` field is declared empty and can be updated via
/// [`record_outcome`]. Each run gets a fresh `job.run_id` so overlapping
/// one-shot and scheduled runs stay distinguishable.
pub fn start_job_span(job: &str) -> Span {
    tracing::info_span!(
        "job.run",
        "job.name" = job,
        "job.run_id" = %Uuid::new_v4(),
        "job.outcome" = tracing::field::Empty,
    )
}

/// Record the final outcome on the given span.
///
/// Emits a tracing `info` event scoped to the given span.
pub fn record_outcome(span: &Span, outcome: &str) {
    span.record("job.outcome", outcome);
    span.in_scope(|| {
        tracing::info!(outcome = outcome, "job_outcome");
    });
}
