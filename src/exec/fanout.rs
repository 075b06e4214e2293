//! Wave fan-out: run an operation over a batch in bounded concurrent waves.
//!
//! The input is split into consecutive waves of at most `per_second_cap`
//! items. Every call in a wave is launched concurrently and the wave is a
//! hard join barrier — the next wave starts only after the whole wave has
//! resolved. An inter-wave delay keeps the downstream service under its
//! per-time-unit cap.
//!
//! There is no retry and no failure isolation here: any operation error
//! fails the entire call and later waves never start. Callers wanting
//! per-item isolation wrap the operation so it returns a sentinel instead
//! of an error (the email driver does exactly that).

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Throughput cap for a fan-out: wave size and the pause between waves.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Maximum items launched concurrently per wave. Must be > 0.
    pub per_second_cap: usize,
    /// Pause inserted between consecutive waves.
    pub delay_between_waves: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_second_cap: 10,
            delay_between_waves: Duration::from_millis(1000),
        }
    }
}

/// Inter-wave delay policy.
///
/// `Fixed` is the plain contract: sleep between waves, nothing after the
/// last one. `SmallBatchScaled` reproduces the alternate observed behavior
/// where a batch that fits in a single wave is still followed by a delay
/// proportional to its size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaveDelay {
    #[default]
    Fixed,
    SmallBatchScaled {
        per_item: Duration,
    },
}

/// Wave fan-out scheduler.
pub struct WaveFanout {
    limit: RateLimit,
    delay: WaveDelay,
}

impl WaveFanout {
    /// Create a scheduler with the given rate limit and the fixed delay policy.
    pub fn new(limit: RateLimit) -> Result<Self> {
        if limit.per_second_cap == 0 {
            return Err(Error::Other(
                "fan-out per_second_cap must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            limit,
            delay: WaveDelay::Fixed,
        })
    }

    /// Override the inter-wave delay policy.
    pub fn with_delay_mode(mut self, delay: WaveDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Run `op` over `items` in waves.
    ///
    /// Results come back in input order: `result[i]` is the outcome for
    /// `items[i]`. Within a wave the calls are launched in input order and
    /// joined in the same order once the whole wave has finished.
    pub async fn execute<T, R, F, Fut>(&self, items: Vec<T>, op: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let total = items.len();
        info!(total, "fan-out: items queued");

        let mut results = Vec::with_capacity(total);
        let mut remaining = items.into_iter();
        let mut index = 0;

        while index < total {
            let take = self.limit.per_second_cap.min(total - index);

            // Launch the whole wave before awaiting anything.
            let handles: Vec<_> = remaining
                .by_ref()
                .take(take)
                .map(|item| tokio::spawn(op(item)))
                .collect();

            info!(wave_size = take, "fan-out: wave launched");

            // Join barrier: every handle is awaited before any outcome is
            // judged, so a failure cannot leave detached siblings running
            // into the next wave.
            let mut wave_outcomes = Vec::with_capacity(take);
            for handle in handles {
                wave_outcomes.push(handle.await);
            }
            for outcome in wave_outcomes {
                results.push(outcome??);
            }
            index += take;

            info!(completed = index, total, "fan-out: wave completed");

            if index < total {
                debug!(
                    delay_ms = self.limit.delay_between_waves.as_millis() as u64,
                    "fan-out: waiting before next wave"
                );
                tokio::time::sleep(self.limit.delay_between_waves).await;
            } else if let WaveDelay::SmallBatchScaled { per_item } = self.delay {
                if total <= self.limit.per_second_cap {
                    let delay = per_item * total as u32;
                    debug!(
                        delay_ms = delay.as_millis() as u64,
                        "fan-out: small-batch delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        info!(results = results.len(), "fan-out: complete");
        Ok(results)
    }
}
