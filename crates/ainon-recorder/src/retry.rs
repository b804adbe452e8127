//! Retry with exponential backoff for backend writes.
//!
//! Only transient backend errors are retried; a permanent rejection is
//! surfaced after the first attempt. Jitter uses `std::time::SystemTime`
//! UNIX nanos as a seed to avoid carrying the `rand` crate.

use ainon_types::error::BackendError;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first try).
    pub max_attempts: u32,
    /// Minimum delay between retries in milliseconds.
    pub min_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Jitter factor (0.0 = no jitter, 1.0 = full jitter).
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_ms: 200,
            max_delay_ms: 5_000,
            jitter: 0.2,
        }
    }
}

/// Result of a retried write.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// The write succeeded.
    Success {
        /// The acknowledgement.
        result: T,
        /// Total attempts made (1 = first try succeeded).
        attempts: u32,
    },
    /// The write gave up: attempts exhausted, or the error was permanent.
    Exhausted {
        /// The error from the last attempt.
        last_error: BackendError,
        /// Total attempts made.
        attempts: u32,
    },
}

/// Compute the delay for a given attempt (0-indexed).
///
/// Formula: `min(min_delay * 2^attempt, max_delay) * (1 + random * jitter)`
pub fn compute_backoff(config: &RetryConfig, attempt: u32) -> u64 {
    let base = config
        .min_delay_ms
        .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
    let capped = base.min(config.max_delay_ms);

    if config.jitter <= 0.0 {
        return capped;
    }

    let frac = pseudo_random_fraction();
    let with_jitter = (capped as f64) + (capped as f64) * frac * config.jitter;

    // Jitter can push slightly above the cap.
    (with_jitter as u64).min(config.max_delay_ms)
}

/// A pseudo-random fraction in `[0, 1)` from the current system time nanos.
/// Not cryptographically secure, but good enough for jitter.
fn pseudo_random_fraction() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let mixed = nanos.wrapping_mul(2654435761); // Knuth multiplicative hash
    (mixed as f64) / (u32::MAX as f64)
}

/// Drive a backend write with retry.
///
/// The closure is called once per attempt. Transient errors sleep the
/// computed backoff and try again up to `max_attempts`; permanent errors
/// return immediately.
pub async fn retry_write<F, Fut, T>(config: &RetryConfig, mut operation: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, BackendError>>,
{
    let max = config.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        attempt = attempt + 1,
                        "write succeeded after {} previous failures", attempt
                    );
                }
                return RetryOutcome::Success {
                    result,
                    attempts: attempt + 1,
                };
            }
            Err(err) => {
                attempt += 1;
                if !err.is_transient() {
                    debug!(attempt, "error is not retryable, giving up: {err}");
                    return RetryOutcome::Exhausted {
                        last_error: err,
                        attempts: attempt,
                    };
                }
                if attempt >= max {
                    warn!(attempt, max_attempts = max, "all retry attempts exhausted: {err}");
                    return RetryOutcome::Exhausted {
                        last_error: err,
                        attempts: attempt,
                    };
                }

                let delay_ms = compute_backoff(config, attempt - 1);
                debug!(attempt, delay_ms, "retrying after transient error: {err}");
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            min_delay_ms: 1,
            max_delay_ms: 10,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_compute_backoff_exponential() {
        let config = RetryConfig {
            max_attempts: 5,
            min_delay_ms: 100,
            max_delay_ms: 100_000,
            jitter: 0.0,
        };
        assert_eq!(compute_backoff(&config, 0), 100);
        assert_eq!(compute_backoff(&config, 1), 200);
        assert_eq!(compute_backoff(&config, 2), 400);
        assert_eq!(compute_backoff(&config, 3), 800);
    }

    #[test]
    fn test_compute_backoff_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            min_delay_ms: 1_000,
            max_delay_ms: 5_000,
            jitter: 0.0,
        };
        assert_eq!(compute_backoff(&config, 0), 1_000);
        assert_eq!(compute_backoff(&config, 2), 4_000);
        assert_eq!(compute_backoff(&config, 3), 5_000);
        assert_eq!(compute_backoff(&config, 10), 5_000);
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let outcome = retry_write(&fast_config(3), || async {
            Ok::<_, BackendError>("ack")
        })
        .await;
        match outcome {
            RetryOutcome::Success { result, attempts } => {
                assert_eq!(result, "ack");
                assert_eq!(attempts, 1);
            }
            _ => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let outcome = retry_write(&fast_config(5), move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(BackendError::Transient("connection reset".to_string()))
                } else {
                    Ok("ack")
                }
            }
        })
        .await;

        match outcome {
            RetryOutcome::Success { attempts, .. } => assert_eq!(attempts, 3),
            _ => panic!("expected success"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_exhausted_at_bound() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let outcome = retry_write(&fast_config(3), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(BackendError::Transient("still down".to_string()))
            }
        })
        .await;

        match outcome {
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                assert!(last_error.is_transient());
                assert_eq!(attempts, 3);
            }
            _ => panic!("expected exhausted"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let outcome = retry_write(&fast_config(5), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(BackendError::Permanent("payload rejected".to_string()))
            }
        })
        .await;

        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 1),
            _ => panic!("expected exhausted"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_delay_ms, 200);
        assert_eq!(config.max_delay_ms, 5_000);
        assert!((config.jitter - 0.2).abs() < f64::EPSILON);
    }
}
