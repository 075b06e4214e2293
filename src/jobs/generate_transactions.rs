//! Generate feedback transactions for accounts that are due one.
//!
//! Fetches a batch of account ids (retry-wrapped), then processes each
//! account through the bounded parallel processor — one failing account
//! never blocks the rest of the batch.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::FeedbackApi;
use crate::config::Config;
use crate::error::Result;
use crate::exec::{BatchTotals, BoundedParallel, Retry};
use crate::model::AccountId;
use crate::telemetry::metrics;

pub struct GenerateTransactionsJob<A> {
    api: Arc<A>,
    batch_size: usize,
    processor: BoundedParallel,
}

impl<A: FeedbackApi + 'static> GenerateTransactionsJob<A> {
    pub const NAME: &'static str = "generate-feedback-transactions";

    pub fn new(api: Arc<A>, config: &Config) -> Self {
        Self {
            api,
            batch_size: config.generate_transactions_batch_size,
            processor: BoundedParallel::new(config.generate_transactions_max_parallelism),
        }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<BatchTotals> {
        super::instrumented(Self::NAME, self.execute(cancel)).await
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<BatchTotals> {
        info!("{} has started", Self::NAME);

        let retry = Retry::new(super::MAX_RETRY_ATTEMPTS);
        let response = retry
            .execute(
                || async {
                    debug!("fetching feedback transaction account ids");
                    self.api.transaction_account_ids(self.batch_size).await
                },
                cancel,
            )
            .await?;

        let account_ids = response.account_ids;
        info!(
            count = account_ids.len(),
            "retrieved feedback transaction accounts for processing"
        );

        let api = Arc::clone(&self.api);
        let op = move |account_id: AccountId| {
            let api = Arc::clone(&api);
            async move {
                api.process_transaction_for_account(&account_id).await?;
                debug!(account = %account_id, "feedback transaction processed");
                Ok(())
            }
        };

        let totals = self.processor.process(account_ids, op, cancel).await;

        metrics::items_processed().add(
            totals.processed as u64,
            &[KeyValue::new("job", Self::NAME)],
        );
        metrics::items_failed().add(totals.failed as u64, &[KeyValue::new("job", Self::NAME)]);

        info!("{} has finished", Self::NAME);
        Ok(totals)
    }
}
