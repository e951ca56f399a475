use std::time::Duration;

use tracing::warn;

use crate::provider::DirectionsError;

/// Bounded exponential backoff for transient provider failures. Permanent
/// failures pass through on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, DirectionsError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectionsError>>,
    {
        let mut backoff = self.initial_backoff;
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        %error,
                        "transient directions failure, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success_does_not_retry() {
        let calls = Cell::new(0u32);

        let result = quick_policy()
            .run(|| {
                calls.set(calls.get() + 1);
                async { Ok::<_, DirectionsError>(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_retry_until_success() {
        let calls = Cell::new(0u32);

        let result = quick_policy()
            .run(|| {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt < 3 {
                        Err(DirectionsError::Timeout)
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_transient_errors_exhaust_attempts() {
        let calls = Cell::new(0u32);

        let result: Result<(), _> = quick_policy()
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(DirectionsError::RateLimited) }
            })
            .await;

        assert!(matches!(result, Err(DirectionsError::RateLimited)));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_fast() {
        let calls = Cell::new(0u32);

        let result: Result<(), _> = quick_policy()
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(DirectionsError::NoRouteFound) }
            })
            .await;

        assert!(matches!(result, Err(DirectionsError::NoRouteFound)));
        assert_eq!(calls.get(), 1);
    }
}
