use std::future::Future;
use std::time::Duration;

/// Delays never grow beyond this, however many attempts are configured.
const MAX_BACKOFF: Duration = Duration::from_millis(8000);

/// Bounded retry with exponential backoff. Which errors are worth retrying
/// is decided by a predicate supplied per call, so each transport keeps its
/// own classification.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: MAX_BACKOFF,
        }
    }

    /// Delay to wait after the given number of failed attempts:
    /// `base * 2^(failed_attempts - 1)`, capped.
    pub fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(31);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exponent));

        delay.min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails a non-retryable way, or the
    /// attempt budget is spent. The last error is handed back to the caller.
    pub async fn run<F, Fut, T, E, P>(&self, mut operation: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut failed_attempts = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    failed_attempts += 1;
                    tracing::warn!(
                        attempt = failed_attempts,
                        error = %error,
                        "Email send attempt failed"
                    );

                    if !retryable(&error) || failed_attempts >= self.max_attempts {
                        return Err(error);
                    }

                    tokio::time::sleep(self.backoff_delay(failed_attempts)).await;
                }
            }
        }
    }
}
