//! Client metrics.
//!
//! # Metrics
//! - `apns_requests_total` (counter): send attempts by outcome
//! - `apns_request_duration_seconds` (histogram): attempt latency
//! - `apns_token_renewals_total` (counter): renewals by result

use std::time::Instant;

use metrics::{counter, histogram};

/// Record one delivery attempt.
pub fn record_request(outcome: &'static str, start: Instant) {
    counter!("apns_requests_total", "outcome" => outcome).increment(1);
    histogram!("apns_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a provider token renewal.
pub fn record_token_renewal(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("apns_token_renewals_total", "result" => result).increment(1);
}
