//! Trigger a full employer-accounts sync on the outer API.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::FeedbackApi;
use crate::error::Result;

pub struct SyncAccountsJob<A> {
    api: Arc<A>,
}

impl<A: FeedbackApi + 'static> SyncAccountsJob<A> {
    pub const NAME: &'static str = "sync-employer-accounts";

    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn run(&self, _cancel: &CancellationToken) -> Result<()> {
        super::instrumented(Self::NAME, self.execute()).await
    }

    async fn execute(&self) -> Result<()> {
        info!("{} has started", Self::NAME);
        self.api.sync_employer_accounts().await?;
        info!("{} has finished", Self::NAME);
        Ok(())
    }
}
