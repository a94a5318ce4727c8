//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! send_with_retry:
//!     → retries.rs (attempt, classify, decide)
//!     → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Only connection and server class failures are retried
//! - Attempt count is always bounded
//! - Jittered backoff prevents synchronized retries across senders

pub mod backoff;
pub mod retries;

pub use retries::{retry, retry_with_backoff};
