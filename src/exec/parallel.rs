//! Bounded parallel processing with per-item retry and failure isolation.
//!
//! A counting semaphore caps how many operations are in flight at once.
//! Each item is retry-wrapped before admission, and an item that exhausts
//! its attempts is counted and logged — it never aborts its siblings. The
//! call resolves only once every item has either succeeded or given up.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::Result;
use crate::exec::retry::Retry;

/// Attempt budget for each item, matching the job drivers' fetch budget.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Aggregate outcome of a bounded parallel batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub processed: usize,
    pub failed: usize,
}

/// Runs a retry-wrapped operation over a batch under a concurrency ceiling.
#[derive(Debug, Clone, Copy)]
pub struct BoundedParallel {
    max_concurrency: usize,
    retry: Retry,
}

impl BoundedParallel {
    /// A processor admitting at most `max_concurrency` items at a time
    /// (minimum 1). Per-item retry is fixed at three attempts.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            retry: Retry::new(MAX_RETRY_ATTEMPTS),
        }
    }

    /// Process every item, isolating failures.
    ///
    /// Returns once all items have resolved. Per-item failures (including
    /// panicked tasks) are counted, never raised; only the counts come back.
    pub async fn process<T, F, Fut>(
        &self,
        items: Vec<T>,
        op: F,
        cancel: &CancellationToken,
    ) -> BatchTotals
    where
        T: Display + Clone + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let total = items.len();
        info!(
            total,
            max_concurrency = self.max_concurrency,
            "processing items with bounded parallelism"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let processed = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let op = Arc::new(op);
        let retry = self.retry;

        let mut handles = Vec::with_capacity(total);
        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let processed = Arc::clone(&processed);
            let failed = Arc::clone(&failed);
            let op = Arc::clone(&op);
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");

                match retry.execute(|| op(item.clone()), &cancel).await {
                    Ok(()) => {
                        processed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        error!(
                            item = %item,
                            error = %err,
                            "failed to process item after {} attempts",
                            retry.max_attempts()
                        );
                    }
                }
            }));
        }

        for handle in handles {
            if handle.await.is_err() {
                // A panicked item task is a failure like any other.
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let totals = BatchTotals {
            processed: processed.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };
        info!(
            processed = totals.processed,
            failed = totals.failed,
            "processing completed"
        );
        totals
    }
}
