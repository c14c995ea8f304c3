//! Shared retry utilities for outbound API calls.
//!
//! Both the GitHub source and the summarizer back off on rate limits and
//! transient server errors using the same exponential policy.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::sync::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES, ProgressCallback, SyncProgress};

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES as usize,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Build the default exponential backoff strategy.
///
/// Starts at 1 second, doubles up to 60 seconds, gives up after 4 retries.
#[must_use]
pub fn default_backoff() -> ExponentialBuilder {
    RetryConfig::default().into_backoff()
}

/// Execute an operation, retrying while `is_retryable` says the error is transient.
///
/// Each retry is logged at debug level and reported as a
/// [`SyncProgress::RateLimitBackoff`] event for `target`.
///
/// # Example
///
/// ```ignore
/// let readme = with_retry(
///     || async { client.get_readme(&item.full_name).await },
///     GitHubError::is_retryable,
///     short_error_message,
///     &item.full_name,
///     None,
/// ).await?;
/// ```
pub async fn with_retry<T, E, F, Fut, IsRetryable, ShortMsg>(
    operation: F,
    is_retryable: IsRetryable,
    short_message: ShortMsg,
    target: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRetryable: Fn(&E) -> bool + Send + Sync + 'static,
    ShortMsg: Fn(&E) -> String + Send + Sync + 'static,
{
    with_retry_config(
        RetryConfig::default(),
        operation,
        is_retryable,
        short_message,
        target,
        on_progress,
    )
    .await
}

/// Like [`with_retry`] with an explicit backoff configuration.
pub async fn with_retry_config<T, E, F, Fut, IsRetryable, ShortMsg>(
    config: RetryConfig,
    mut operation: F,
    is_retryable: IsRetryable,
    short_message: ShortMsg,
    target: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRetryable: Fn(&E) -> bool + Send + Sync + 'static,
    ShortMsg: Fn(&E) -> String + Send + Sync + 'static,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.into_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            if let Some(cb) = on_progress {
                cb(SyncProgress::RateLimitBackoff {
                    target: target.to_string(),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                });
            }
            tracing::debug!(
                target_name = target,
                attempt = current_attempt,
                "Retrying in {:?}: {}",
                dur,
                short_message(err)
            );
        })
        .when(is_retryable)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();

        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_RETRIES as usize);
        assert!(config.with_jitter);
    }

    #[test]
    fn test_retry_config_custom() {
        let config = RetryConfig::new(Duration::from_secs(2), Duration::from_secs(30), 3)
            .with_jitter(false);

        assert_eq!(config.min_delay, Duration::from_secs(2));
        assert_eq!(config.max_retries, 3);
        assert!(!config.with_jitter);
    }

    #[derive(Debug, Clone)]
    struct TestError {
        message: &'static str,
        transient: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestError {}

    #[tokio::test(start_paused = true)]
    async fn with_retry_retries_transient_errors_and_emits_progress() {
        let calls = Arc::new(AtomicU32::new(0));

        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        let calls_op = Arc::clone(&calls);
        let result = with_retry(
            move || {
                let calls = Arc::clone(&calls_op);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(TestError {
                            message: "429 Too Many Requests\nbody",
                            transient: true,
                        })
                    } else {
                        Ok("done")
                    }
                }
            },
            |e: &TestError| e.transient,
            |e: &TestError| e.message.lines().next().unwrap_or_default().to_string(),
            "octocat/hello",
            Some(&callback),
        )
        .await;

        assert_eq!(result.expect("should succeed after retries"), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(events.len(), 2);
        match &events[1] {
            SyncProgress::RateLimitBackoff {
                target, attempt, ..
            } => {
                assert_eq!(target, "octocat/hello");
                assert_eq!(*attempt, 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_does_not_retry_permanent_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_op = Arc::clone(&calls);

        let result: Result<(), TestError> = with_retry(
            move || {
                let calls = Arc::clone(&calls_op);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError {
                        message: "401 Unauthorized",
                        transient: false,
                    })
                }
            },
            |e: &TestError| e.transient,
            |e: &TestError| e.message.to_string(),
            "octocat/hello",
            None,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_op = Arc::clone(&calls);

        let result: Result<(), TestError> = with_retry_config(
            RetryConfig::new(Duration::from_millis(10), Duration::from_millis(20), 2),
            move || {
                let calls = Arc::clone(&calls_op);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError {
                        message: "503",
                        transient: true,
                    })
                }
            },
            |e: &TestError| e.transient,
            |e: &TestError| e.message.to_string(),
            "page 2",
            None,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
