//! Retry with exponential backoff for a single fallible async operation.
//!
//! Every failure is treated the same — no transient/permanent distinction.
//! Attempt 1 runs immediately; after a failed attempt k the executor sleeps
//! 2^k seconds before attempt k+1. The backoff sleep is the only suspension
//! point and honors the supplied cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{Error, Result};

/// Retry policy for a single operation. Cheap to copy; carries no state
/// between calls.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_attempts: u32,
}

impl Retry {
    /// A policy allowing up to `max_attempts` total attempts (minimum 1).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted.
    ///
    /// The last attempt's error is returned unchanged. Cancelling the token
    /// during a backoff wait aborts the loop with [`Error::Cancelled`]; an
    /// in-flight attempt is never preempted.
    pub async fn execute<T, F, Fut>(&self, mut op: F, cancel: &CancellationToken) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if failures < self.max_attempts - 1 => {
                    failures += 1;
                    warn!(
                        error = %err,
                        "Retrying operation (attempt {} of {})",
                        failures + 1,
                        self.max_attempts
                    );

                    let delay = Duration::from_secs(2u64.pow(failures));
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}
