//! Send feedback emails for transactions that are due one.
//!
//! Fetches a batch of transaction ids (retry-wrapped), then fans the send
//! calls out in rate-limited waves. The per-item operation is retry-wrapped
//! and converts an exhausted failure into a `false` sentinel, so one dead
//! transaction never aborts the wave barrier.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::FeedbackApi;
use crate::config::Config;
use crate::error::Result;
use crate::exec::{BatchTotals, RateLimit, Retry, WaveFanout};
use crate::model::{SendEmailsRequest, TransactionId};
use crate::telemetry::metrics;

pub struct ProcessEmailsJob<A> {
    api: Arc<A>,
    batch_size: usize,
    fanout: WaveFanout,
    request: Arc<SendEmailsRequest>,
}

impl<A: FeedbackApi + 'static> ProcessEmailsJob<A> {
    pub const NAME: &'static str = "process-feedback-emails";

    pub fn new(api: Arc<A>, config: &Config) -> Result<Self> {
        let fanout = WaveFanout::new(RateLimit {
            per_second_cap: config.process_emails_per_second_cap,
            delay_between_waves: config.process_emails_wave_delay,
        })?;

        Ok(Self {
            api,
            batch_size: config.process_emails_batch_size,
            fanout,
            request: Arc::new(SendEmailsRequest {
                notification_templates: config.notification_templates.clone(),
                employer_accounts_base_url: config.employer_accounts_base_url.clone(),
                employer_feedback_base_url: config.employer_feedback_base_url.clone(),
            }),
        })
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
                    debug!("fetching feedback transactions to email");
                    self.api.transactions_batch(self.batch_size).await
                },
                cancel,
            )
            .await?;

        let transaction_ids = response.feedback_transactions;
        info!(
            count = transaction_ids.len(),
            "retrieved feedback transactions to email"
        );

        let api = Arc::clone(&self.api);
        let request = Arc::clone(&self.request);
        let cancel_for_items = cancel.clone();
        let op = move |transaction_id: TransactionId| {
            let api = Arc::clone(&api);
            let request = Arc::clone(&request);
            let cancel = cancel_for_items.clone();
            async move {
                let send = retry
                    .execute(
                        || async { api.send_feedback_emails(transaction_id, &request).await },
                        &cancel,
                    )
                    .await;
                match send {
                    Ok(()) => {
                        debug!(transaction = %transaction_id, "feedback email sent");
                        Ok(true)
                    }
                    Err(err) => {
                        error!(
                            transaction = %transaction_id,
                            error = %err,
                            "failed to send email after {} attempts",
                            retry.max_attempts()
                        );
                        Ok(false)
                    }
                }
            }
        };

        let outcomes = self.fanout.execute(transaction_ids, op).await?;

        let processed = outcomes.iter().filter(|sent| **sent).count();
        let totals = BatchTotals {
            processed,
            failed: outcomes.len() - processed,
        };

        metrics::items_processed().add(
            totals.processed as u64,
            &[KeyValue::new("job", Self::NAME)],
        );
        metrics::items_failed().add(totals.failed as u64, &[KeyValue::new("job", Self::NAME)]);

        info!(
            processed = totals.processed,
            failed = totals.failed,
            "{} has finished",
            Self::NAME
        );
        Ok(totals)
    }
}
