//! Tests for the retry executor: attempt counting, backoff timing,
//! log contract, cancellation.
//!
//! All tests run on a paused clock, so the exponential backoff sleeps are
//! virtual and the elapsed assertions are exact.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use feedback_jobs::error::Error;
use feedback_jobs::exec::Retry;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// MakeWriter that appends formatted events to a shared buffer.
#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (CaptureWriter, tracing::subscriber::DefaultGuard) {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (writer, guard)
}

// ---------------------------------------------------------------------------
// Success paths
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn succeeds_immediately_with_single_attempt() {
    let attempts = AtomicU32::new(0);
    let retry = Retry::new(3);
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let result = retry
        .execute(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            },
            &cancel,
        )
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    // No backoff for a first-attempt success.
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn fails_twice_then_succeeds_on_third_attempt() {
    let (writer, _guard) = capture_logs();

    let attempts = AtomicU32::new(0);
    let retry = Retry::new(3);
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let result = retry
        .execute(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(Error::Other(format!("transient failure {n}")))
                    } else {
                        Ok(n)
                    }
                }
            },
            &cancel,
        )
        .await;

    // Invoked exactly three times, returning the third attempt's value.
    assert_eq!(result.unwrap(), 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    // Backoff is 2^1 then 2^2 seconds.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");

    // Exactly two retry warnings, with the right attempt labels.
    let logs = writer.contents();
    assert_eq!(logs.matches("Retrying operation").count(), 2);
    assert!(logs.contains("attempt 2 of 3"));
    assert!(logs.contains("attempt 3 of 3"));
}

// ---------------------------------------------------------------------------
// Exhaustion
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn exhausted_attempts_propagate_last_error() {
    let attempts = AtomicU32::new(0);
    let retry = Retry::new(3);
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let result: Result<(), _> = retry
        .execute(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(Error::Other(format!("failure {n}"))) }
            },
            &cancel,
        )
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "failure 3");

    // Two backoffs happened before the final attempt.
    assert!(started.elapsed() >= Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn single_attempt_budget_never_retries() {
    let attempts = AtomicU32::new(0);
    let retry = Retry::new(1);
    let cancel = CancellationToken::new();

    let result: Result<(), _> = retry
        .execute(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Other("no luck".to_string())) }
            },
            &cancel,
        )
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancelled_token_aborts_backoff_wait() {
    let attempts = Arc::new(AtomicU32::new(0));
    let retry = Retry::new(3);
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        // Fire mid-way through the first 2s backoff.
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let op_attempts = Arc::clone(&attempts);
    let result: Result<(), _> = retry
        .execute(
            || {
                op_attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Other("still down".to_string())) }
            },
            &cancel,
        )
        .await;

    assert!(matches!(result.unwrap_err(), Error::Cancelled));
    // The second attempt never ran.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_stops_after_first_failure() {
    let attempts = AtomicU32::new(0);
    let retry = Retry::new(3);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result: Result<(), _> = retry
        .execute(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Other("down".to_string())) }
            },
            &cancel,
        )
        .await;

    assert!(matches!(result.unwrap_err(), Error::Cancelled));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
