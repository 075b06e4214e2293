//! Trigger feedback summary generation on the outer API.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::FeedbackApi;
use crate::error::Result;

pub struct GenerateSummariesJob<A> {
    api: Arc<A>,
}

impl<A: FeedbackApi + 'static> GenerateSummariesJob<A> {
    pub const NAME: &'static str = "generate-feedback-summaries";

    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn run(&self, _cancel: &CancellationToken) -> Result<()> {
        super::instrumented(Self::NAME, self.execute()).await
    }

    async fn execute(&self) -> Result<()> {
        info!("{} has started", Self::NAME);
        self.api.generate_feedback_summaries().await?;
        info!("{} has finished", Self::NAME);
        Ok(())
    }
}
