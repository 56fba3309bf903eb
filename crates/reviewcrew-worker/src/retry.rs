//! Bounded retry with exponential backoff for task execution.

use std::time::Duration;

use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, error, info, warn};

use reviewcrew_common::{RetryConfig, ReviewError};

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// has been retried `config.max_retries` times.
pub async fn execute_with_retry<F, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, ReviewError>
where
    F: FnMut() -> Result<T, ReviewError>,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(config.initial_interval_ms))
        .with_max_interval(Duration::from_millis(config.max_interval_ms))
        .with_multiplier(config.multiplier)
        .with_max_elapsed_time(None)
        .build();

    let max_retries = config.max_retries;
    let mut attempt = 0usize;

    retry(policy, || {
        attempt += 1;
        let current = attempt;
        debug!("Executing {} (attempt {}/{})", operation_name, current, max_retries + 1);
        let result = operation();

        async move {
            match result {
                Ok(value) => {
                    if current > 1 {
                        info!("Operation '{}' succeeded after {} attempts", operation_name, current);
                    }
                    Ok(value)
                }
                Err(e) if e.is_retryable() && current <= max_retries => {
                    warn!("Operation '{}' failed (attempt {}): {}", operation_name, current, e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => {
                    error!(
                        "Operation '{}' failed permanently after {} attempts: {}",
                        operation_name, current, e
                    );
                    Err(backoff::Error::permanent(e))
                }
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> RetryConfig {
        RetryConfig { max_retries: 2, initial_interval_ms: 1, max_interval_ms: 5, multiplier: 2.0 }
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let mut calls = 0;
        let result = execute_with_retry(&fast(), "flaky", || {
            calls += 1;
            if calls < 3 {
                Err(ReviewError::Transient("broker unavailable".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_config_error_is_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = execute_with_retry(&fast(), "bad_config", || {
            calls += 1;
            Err(ReviewError::Config("unknown normalization 'log'".into()))
        })
        .await;
        assert!(matches!(result, Err(ReviewError::Config(_))));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let mut calls = 0;
        let result: Result<(), _> = execute_with_retry(&fast(), "down", || {
            calls += 1;
            Err(ReviewError::Transient("storage unavailable".into()))
        })
        .await;
        assert!(matches!(result, Err(ReviewError::Transient(_))));
        assert_eq!(calls, 3);
    }
}
