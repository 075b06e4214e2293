//! Data model for the feedback outer API and job reporting.
//!
//! Ids are opaque to the engine — the account path keys on hashed account
//! ids (strings), the email path on numeric transaction ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exec::BatchTotals;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Newtype for employer account ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for feedback transaction ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Outer API payloads
// ---------------------------------------------------------------------------

/// Batch of account ids due a feedback transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdsResponse {
    pub account_ids: Vec<AccountId>,
}

/// Batch of feedback transactions due an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsBatchResponse {
    pub feedback_transactions: Vec<TransactionId>,
}

/// A notification template the email service can render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub name: String,
    pub id: Uuid,
}

/// Body for the send-feedback-emails call. The outer API resolves the
/// recipient list; we only supply templates and the link base urls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailsRequest {
    pub notification_templates: Vec<NotificationTemplate>,
    pub employer_accounts_base_url: String,
    pub employer_feedback_base_url: String,
}

// ---------------------------------------------------------------------------
// Job reporting
// ---------------------------------------------------------------------------

/// Summary of a single job run, for the one-shot CLI path.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: &'static str,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Present for batch jobs; `None` for single-call jobs.
    pub totals: Option<BatchTotals>,
}
