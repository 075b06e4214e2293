//! # feedback-jobs
//!
//! Scheduled batch jobs for the employer feedback service.
//!
//! Pulls batches of work (account ids, transaction ids) from the feedback
//! outer API and drives a per-item remote call across them through the
//! batch-execution engine in [`exec`]: retry with exponential backoff,
//! wave fan-out under a throughput cap, and semaphore-bounded parallelism.

pub mod api;
pub mod config;
pub mod error;
pub mod exec;
pub mod jobs;
pub mod model;
pub mod telemetry;
