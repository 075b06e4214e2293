//! Batch-execution engine: retry with backoff, wave fan-out, bounded parallelism.

pub mod fanout;
pub mod parallel;
pub mod retry;

pub use fanout::{RateLimit, WaveDelay, WaveFanout};
pub use parallel::{BatchTotals, BoundedParallel};
pub use retry::Retry;
