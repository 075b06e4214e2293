//! Error types for feedback-jobs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("api request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("batch task failed to join: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
