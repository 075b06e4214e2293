//! Job drivers: thin compositions of a fetch call and the execution engine.
//!
//! Each driver pulls its batch from the outer API (retry-wrapped), hands the
//! ids to the engine primitive that matches its throughput policy, and
//! reports aggregate totals. The scheduler runs them on fixed intervals.

pub mod generate_summaries;
pub mod generate_transactions;
pub mod process_emails;
pub mod scheduler;
pub mod sync_accounts;

pub use generate_summaries::GenerateSummariesJob;
pub use generate_transactions::GenerateTransactionsJob;
pub use process_emails::ProcessEmailsJob;
pub use scheduler::JobScheduler;
pub use sync_accounts::SyncAccountsJob;

use std::future::Future;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Instrument;

use crate::error::Result;
use crate::telemetry::{job, metrics};

/// Attempt budget shared by fetch and per-item calls across the drivers.
pub(crate) const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Run a job body inside a `job.run` span, recording outcome, duration
/// metrics, and the fatal error event on failure.
pub(crate) async fn instrumented<T, Fut>(name: &'static str, body: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let span = job::start_job_span(name);
    let started = Instant::now();

    let result = body.instrument(span.clone()).await;

    let outcome = if result.is_ok() { "completed" } else { "failed" };
    job::record_outcome(&span, outcome);
    metrics::job_runs().add(
        1,
        &[
            KeyValue::new("job", name),
            KeyValue::new("outcome", outcome),
        ],
    );
    metrics::job_duration_ms().record(
        started.elapsed().as_millis() as f64,
        &[KeyValue::new("job", name)],
    );

    if let Err(ref err) = result {
        span.in_scope(|| tracing::error!(error = %err, "{name} has failed"));
    }
    result
}
