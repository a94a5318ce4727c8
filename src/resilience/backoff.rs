//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay before attempt `attempt + 1`, given that `attempt` attempts failed.
///
/// Doubles from `base_delay_ms`, capped at `max_delay_ms`, then subtracts up
/// to a quarter of the delay at random.
pub fn backoff_delay(policy: &RetryConfig, attempt: u32) -> Duration {
    if attempt == 0 || policy.base_delay_ms == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    let capped = policy
        .base_delay_ms
        .saturating_mul(factor)
        .min(policy.max_delay_ms);

    let jitter_range = capped / 4;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped - jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base: u64, max: u64) -> RetryConfig {
        RetryConfig {
            max_attempts: 5,
            base_delay_ms: base,
            max_delay_ms: max,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let p = policy(100, 1000);

        let first = backoff_delay(&p, 1).as_millis();
        assert!((75..=100).contains(&first));

        let second = backoff_delay(&p, 2).as_millis();
        assert!((150..=200).contains(&second));

        let capped = backoff_delay(&p, 40).as_millis();
        assert!((750..=1000).contains(&capped));
    }

    #[test]
    fn test_zero_base_means_no_delay() {
        assert_eq!(backoff_delay(&policy(0, 1000), 3), Duration::ZERO);
        assert_eq!(backoff_delay(&policy(100, 1000), 0), Duration::ZERO);
    }
}
