//! Bounded, classification-gated retries.

use std::future::Future;

use crate::config::RetryConfig;
use crate::error::ApnsError;
use crate::resilience::backoff::backoff_delay;

/// Run `operation` until it succeeds or `max_attempts` is exhausted.
///
/// Only temporary failures (connection or server class) are retried; any
/// other error is returned straight away. `max_attempts` below 1 is treated
/// as 1. No delay is inserted between attempts.
pub async fn retry<T, F, Fut>(operation: F, max_attempts: u32) -> Result<T, ApnsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApnsError>>,
{
    run(operation, max_attempts, None).await
}

/// Like [`retry`], sleeping with jittered exponential backoff between
/// attempts and taking the attempt limit from `policy`.
pub async fn retry_with_backoff<T, F, Fut>(operation: F, policy: &RetryConfig) -> Result<T, ApnsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApnsError>>,
{
    run(operation, policy.max_attempts, Some(policy)).await
}

async fn run<T, F, Fut>(mut operation: F, max_attempts: u32, policy: Option<&RetryConfig>) -> Result<T, ApnsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApnsError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempts < max_attempts && e.is_temporary() => {
                let delay = policy.map(|p| backoff_delay(p, attempts)).unwrap_or_default();
                tracing::info!(attempt = attempts, delay = ?delay, error = %e, "Retrying notification");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}
