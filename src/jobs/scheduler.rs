//! Interval scheduler: runs each job on its own cadence until shutdown.
//!
//! One `tokio::time::interval` per job, multiplexed through a single
//! `select!` loop. A failed run is already logged by the driver; the
//! scheduler just moves on to the next tick. Sync and generate-transactions
//! fire immediately on startup; the email and summary jobs wait one full
//! period first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::FeedbackApi;
use crate::config::Config;
use crate::error::Result;

use super::{
    GenerateSummariesJob, GenerateTransactionsJob, ProcessEmailsJob, SyncAccountsJob,
};

struct Intervals {
    sync_accounts: Duration,
    generate_transactions: Duration,
    process_emails: Duration,
    generate_summaries: Duration,
}

/// Drives the four feedback jobs on fixed intervals.
pub struct JobScheduler<A> {
    sync_accounts: SyncAccountsJob<A>,
    generate_transactions: GenerateTransactionsJob<A>,
    process_emails: ProcessEmailsJob<A>,
    generate_summaries: GenerateSummariesJob<A>,
    intervals: Intervals,
    shutdown: Arc<Notify>,
}

impl<A: FeedbackApi + 'static> JobScheduler<A> {
    pub fn new(api: Arc<A>, config: &Config) -> Result<Self> {
        Ok(Self {
            sync_accounts: SyncAccountsJob::new(Arc::clone(&api)),
            generate_transactions: GenerateTransactionsJob::new(Arc::clone(&api), config),
            process_emails: ProcessEmailsJob::new(Arc::clone(&api), config)?,
            generate_summaries: GenerateSummariesJob::new(api),
            intervals: Intervals {
                sync_accounts: config.sync_accounts_interval,
                generate_transactions: config.generate_transactions_interval,
                process_emails: config.process_emails_interval,
                generate_summaries: config.generate_summaries_interval,
            },
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Signal the scheduler to stop after the current run.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Handle for signalling shutdown from another task.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Run the scheduling loop until shutdown is signalled.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        // Runs-on-startup jobs tick immediately; the rest wait a period.
        let mut sync_tick = interval(self.intervals.sync_accounts);
        let mut generate_tick = interval(self.intervals.generate_transactions);
        let mut emails_tick = interval_at(
            Instant::now() + self.intervals.process_emails,
            self.intervals.process_emails,
        );
        let mut summaries_tick = interval_at(
            Instant::now() + self.intervals.generate_summaries,
            self.intervals.generate_summaries,
        );
        for tick in [
            &mut sync_tick,
            &mut generate_tick,
            &mut emails_tick,
            &mut summaries_tick,
        ] {
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        info!("job scheduler started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("job scheduler shutting down");
                    return Ok(());
                }
                _ = sync_tick.tick() => {
                    let _ = self.sync_accounts.run(&cancel).await;
                }
                _ = generate_tick.tick() => {
                    let _ = self.generate_transactions.run(&cancel).await;
                }
                _ = emails_tick.tick() => {
                    let _ = self.process_emails.run(&cancel).await;
                }
                _ = summaries_tick.tick() => {
                    let _ = self.generate_summaries.run(&cancel).await;
                }
            }
        }
    }
}
