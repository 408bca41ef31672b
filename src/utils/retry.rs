//! Retry utilities with exponential backoff for flaky catalog calls.
//!
//! The catalog sporadically answers with 5xx errors, so any call to it can be
//! wrapped in a [`Retry`]. Each [`Retry::run`] call is independent: the
//! executor keeps no state between invocations.

use regex::Regex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::time::sleep;

use crate::catalog::CatalogError;

static HTTP_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"HTTP response code: (\d+)").expect("valid HTTP status regex")
});

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfiguration {
    max_retries: u32,
    interval: Duration,
    multiplier: f64,
}

impl RetryConfiguration {
    /// 5 attempts, waiting 2s between each attempt.
    pub const SIMPLE: Self = Self {
        max_retries: 5,
        interval: Duration::from_millis(2_000),
        multiplier: 1.0,
    };

    /// 5 attempts, waiting 500ms, 1s, 2s, 4s between them.
    pub const EXPONENTIAL: Self = Self {
        max_retries: 5,
        interval: Duration::from_millis(500),
        multiplier: 2.0,
    };

    /// Create a configuration, rejecting non-positive values.
    ///
    /// Waits are counted in whole milliseconds, so `interval` must be at least 1ms.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Maximum number of attempts before giving up
    /// * `interval` - Time to wait after the first failed attempt
    /// * `multiplier` - Factor applied to the wait time after each further failure
    pub fn new(max_retries: u32, interval: Duration, multiplier: f64) -> Result<Self, CatalogError> {
        if max_retries == 0 || interval < Duration::from_millis(1) || !(multiplier > 0.0) {
            return Err(CatalogError::InvalidConfig(format!(
                "max_retries and multiplier must be positive, interval at least 1ms \
                 (got {}, {:?}, {})",
                max_retries, interval, multiplier
            )));
        }

        Ok(Self {
            max_retries,
            interval,
            multiplier,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The wait times, one per attempt: `interval`, `interval * multiplier`, ...
    ///
    /// Values are truncated to whole milliseconds at every step.
    pub fn intervals(&self) -> Vec<Duration> {
        let mut intervals = Vec::with_capacity(self.max_retries as usize);
        let mut current = self.interval.as_millis() as u64;

        for _ in 0..self.max_retries {
            intervals.push(Duration::from_millis(current));
            current = (current as f64 * self.multiplier) as u64;
        }

        intervals
    }
}

impl Default for RetryConfiguration {
    fn default() -> Self {
        Self::EXPONENTIAL
    }
}

/// Returns true only when the error message carries an HTTP 5XX status,
/// in the form `HTTP response code: <status>`.
pub fn retry_if_server_fault<E: fmt::Display + ?Sized>(error: &E) -> bool {
    HTTP_STATUS
        .captures(&error.to_string())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .is_some_and(|status| (500..=599).contains(&status))
}

/// Runs an async operation, retrying it while it fails with retryable errors.
pub struct Retry<E> {
    configuration: RetryConfiguration,
    retry_when: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E: fmt::Display + 'static> Retry<E> {
    /// Retry only on server faults (see [`retry_if_server_fault`]).
    pub fn new(configuration: RetryConfiguration) -> Self {
        Self::with_predicate(configuration, |error: &E| retry_if_server_fault(error))
    }
}

impl<E> Retry<E> {
    /// Retry whenever `retry_when` returns true for the error.
    pub fn with_predicate<P>(configuration: RetryConfiguration, retry_when: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            configuration,
            retry_when: Arc::new(retry_when),
        }
    }

    pub fn configuration(&self) -> &RetryConfiguration {
        &self.configuration
    }

    /// Execute `body`, at least once and at most `max_retries` times.
    ///
    /// A non-retryable error is returned immediately. When all attempts are
    /// used up, the last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut body: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let intervals = self.configuration.intervals();
        let max_attempts = self.configuration.max_retries.max(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let error = match body().await {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!(
                            "Operation succeeded on attempt {} after {} transient failures",
                            attempt,
                            attempt - 1
                        );
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            if !(self.retry_when)(&error) {
                tracing::debug!("Non-retryable error on attempt {}: {}", attempt, error);
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::warn!("Operation failed after {} attempts: {}", attempt, error);
                return Err(error);
            }

            let delay = intervals
                .get(attempt as usize - 1)
                .copied()
                .unwrap_or(self.configuration.interval);

            tracing::debug!(
                "Retryable error on attempt {}/{}: {}, retrying in {:?}",
                attempt,
                max_attempts,
                error,
                delay
            );

            sleep(delay).await;
        }
    }
}

impl<E> Clone for Retry<E> {
    fn clone(&self) -> Self {
        Self {
            configuration: self.configuration,
            retry_when: Arc::clone(&self.retry_when),
        }
    }
}

impl<E> fmt::Debug for Retry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}
