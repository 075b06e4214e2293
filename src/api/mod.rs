//! Feedback outer API: trait for the job drivers, reqwest implementation.
//!
//! The trait keeps the drivers testable — tests substitute stub
//! implementations with scripted failures. Methods return
//! `impl Future + Send` so driver closures can be spawned onto the runtime.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    AccountId, AccountIdsResponse, SendEmailsRequest, TransactionId, TransactionsBatchResponse,
};

/// Operations the jobs drive against the feedback outer API.
pub trait FeedbackApi: Send + Sync {
    /// Fetch up to `batch_size` account ids due a feedback transaction.
    fn transaction_account_ids(
        &self,
        batch_size: usize,
    ) -> impl Future<Output = Result<AccountIdsResponse>> + Send;

    /// Create the feedback transaction for one account.
    fn process_transaction_for_account(
        &self,
        account_id: &AccountId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch up to `batch_size` transactions due an email.
    fn transactions_batch(
        &self,
        batch_size: usize,
    ) -> impl Future<Output = Result<TransactionsBatchResponse>> + Send;

    /// Send the feedback email(s) for one transaction.
    fn send_feedback_emails(
        &self,
        transaction_id: TransactionId,
        request: &SendEmailsRequest,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Trigger a full employer-accounts sync on the outer API.
    fn sync_employer_accounts(&self) -> impl Future<Output = Result<()>> + Send;

    /// Trigger feedback summary generation on the outer API.
    fn generate_feedback_summaries(&self) -> impl Future<Output = Result<()>> + Send;
}

/// HTTP implementation against the configured outer API base url.
pub struct HttpFeedbackApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeedbackApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(api_key_headers(&config.outer_api_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: config.outer_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status,
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn post(&self, path: &str, body: Option<&serde_json::Value>) -> Result<()> {
        debug!(path, "POST");
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status,
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

fn api_key_headers(key: &SecretString) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(key.expose_secret())
        .map_err(|_| Error::Config("outer API key is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    headers.insert("X-Api-Key", value);
    Ok(headers)
}

impl FeedbackApi for HttpFeedbackApi {
    fn transaction_account_ids(
        &self,
        batch_size: usize,
    ) -> impl Future<Output = Result<AccountIdsResponse>> + Send {
        async move {
            self.get_json(&format!("/feedbacktransactions/accounts?batchSize={batch_size}"))
                .await
        }
    }

    fn process_transaction_for_account(
        &self,
        account_id: &AccountId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.post(&format!("/feedbacktransactions/accounts/{account_id}"), None)
                .await
        }
    }

    fn transactions_batch(
        &self,
        batch_size: usize,
    ) -> impl Future<Output = Result<TransactionsBatchResponse>> + Send {
        async move {
            self.get_json(&format!("/feedbacktransactions?batchSize={batch_size}"))
                .await
        }
    }

    fn send_feedback_emails(
        &self,
        transaction_id: TransactionId,
        request: &SendEmailsRequest,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let body = serde_json::to_value(request)
                .map_err(|e| Error::Other(format!("serialize email request: {e}")))?;
            self.post(&format!("/feedbacktransactions/{transaction_id}/emails"), Some(&body))
                .await
        }
    }

    fn sync_employer_accounts(&self) -> impl Future<Output = Result<()>> + Send {
        async move { self.post("/employeraccounts/sync", None).await }
    }

    fn generate_feedback_summaries(&self) -> impl Future<Output = Result<()>> + Send {
        async move { self.post("/feedbacksummaries/generate", None).await }
    }
}
