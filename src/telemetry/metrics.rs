//! Metric instrument factories for feedback-jobs.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"feedback-jobs"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for feedback-jobs instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("feedback-jobs")
}

/// Counter: job runs.
/// Labels: `job`, `outcome` ("completed" | "failed").
pub fn job_runs() -> Counter<u64> {
    meter()
        .u64_counter("feedback.jobs.runs")
        .with_description("Number of job runs")
        .build()
}

/// Counter: items processed successfully across batch jobs.
/// Labels: `job`.
pub fn items_processed() -> Counter<u64> {
    meter()
        .u64_counter("feedback.items.processed")
        .with_description("Number of batch items processed successfully")
        .build()
}

/// Counter: items that exhausted their retries.
/// Labels: `job`.
pub fn items_failed() -> Counter<u64> {
    meter()
        .u64_counter("feedback.items.failed")
        .with_description("Number of batch items that failed after retries")
        .build()
}

/// Histogram: job run duration in milliseconds.
/// Labels: `job`.
pub fn job_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("feedback.job.duration_ms")
        .with_description("Job run duration in milliseconds")
        .with_unit("ms")
        .build()
}
