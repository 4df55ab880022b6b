//! Bounded exponential backoff around transport calls.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::{error::WapiError, transport::TransportError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_SECONDS: f64 = 1.0;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
/// Upper bound for a single backoff sleep.
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// Something that can wait. Production code uses [`TokioSleeper`].
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry settings as they appear in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_seconds: f64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_seconds: DEFAULT_BACKOFF_SECONDS,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// Per-call bookkeeping. Lives only for the duration of one [`RetryPolicy::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    pub attempt: u32,
    pub max_attempts: u32,
    pub backoff_seconds: f64,
    pub multiplier: f64,
}

impl RetryState {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts.max(1),
            backoff_seconds: config.backoff_seconds,
            multiplier: config.multiplier,
        }
    }

    fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Delay before the next attempt, capped at [`MAX_DELAY`]; grows the backoff for the one after.
    fn next_delay(&mut self) -> Duration {
        let delay = Duration::try_from_secs_f64(self.backoff_seconds.max(0.0))
            .map_or(MAX_DELAY, |delay| delay.min(MAX_DELAY));
        self.backoff_seconds *= self.multiplier;
        delay
    }
}

/// Retries a transport call on transient failures only.
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Box<dyn Sleeper>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self::with_sleeper(config, Box::new(TokioSleeper))
    }

    pub fn with_sleeper(config: RetryConfig, sleeper: Box<dyn Sleeper>) -> Self {
        Self { config, sleeper }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `call` until it succeeds, fails permanently, or the attempt budget is spent.
    ///
    /// `short_path` names the object being addressed and ends up in the error.
    pub async fn run<T, F, Fut>(&self, short_path: &str, mut call: F) -> Result<T, WapiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut state = RetryState::new(&self.config);

        loop {
            state.attempt += 1;
            trace!(
                "{}: attempt {}/{}",
                short_path,
                state.attempt,
                state.max_attempts
            );

            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_transient() || state.exhausted() {
                return Err(WapiError::Request {
                    short_path: short_path.to_string(),
                    attempts: state.attempt,
                    source: error,
                });
            }

            let delay = state.next_delay();
            warn!(
                "{}: transient failure on attempt {} ({}), retrying in {:.1}s",
                short_path,
                state.attempt,
                error,
                delay.as_secs_f64()
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records requested delays instead of waiting.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        pub(crate) fn seconds(&self) -> Vec<f64> {
            self.delays
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_secs_f64())
                .collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn policy() -> (RetryPolicy, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::with_sleeper(RetryConfig::default(), Box::new(sleeper.clone()));
        (policy, sleeper)
    }

    fn unavailable() -> TransportError {
        TransportError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        }
    }

    async fn fail_n_times(policy: &RetryPolicy, n: u32) -> (Result<&'static str, WapiError>, u32) {
        let calls = AtomicU32::new(0);
        let result = policy
            .run("fileop", || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < n {
                        Err(unavailable())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_succeeds_when_failures_below_budget() {
        for n in 0..DEFAULT_MAX_ATTEMPTS {
            let (policy, _) = policy();
            let (result, calls) = fail_n_times(&policy, n).await;
            assert_eq!(result.unwrap(), "ok");
            assert_eq!(calls, n + 1);
        }
    }

    #[tokio::test]
    async fn test_exhausts_after_three_attempts() {
        let (policy, sleeper) = policy();
        let (result, calls) = fail_n_times(&policy, u32::MAX).await;
        assert_eq!(calls, 3);
        match result {
            Err(WapiError::Request {
                short_path,
                attempts,
                source,
            }) => {
                assert_eq!(short_path, "fileop");
                assert_eq!(attempts, 3);
                assert_eq!(source.status(), Some(503));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sleeper.seconds(), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_oversized_backoff_is_capped() {
        let sleeper = RecordingSleeper::default();
        let config = RetryConfig {
            max_attempts: 3,
            backoff_seconds: 1e20,
            multiplier: 2.0,
        };
        let policy = RetryPolicy::with_sleeper(config, Box::new(sleeper.clone()));
        let (result, calls) = fail_n_times(&policy, u32::MAX).await;
        assert!(matches!(result, Err(WapiError::Request { attempts: 3, .. })));
        assert_eq!(calls, 3);
        assert_eq!(sleeper.seconds(), vec![300.0, 300.0]);
    }

    #[tokio::test]
    async fn test_backoff_growth_saturates() {
        let sleeper = RecordingSleeper::default();
        let config = RetryConfig {
            max_attempts: 4,
            backoff_seconds: 200.0,
            multiplier: f64::MAX,
        };
        let policy = RetryPolicy::with_sleeper(config, Box::new(sleeper.clone()));
        let (_, calls) = fail_n_times(&policy, u32::MAX).await;
        assert_eq!(calls, 4);
        assert_eq!(sleeper.seconds(), vec![200.0, 300.0, 300.0]);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let (policy, sleeper) = policy();
        let calls = AtomicU32::new(0);
        let result: Result<(), WapiError> = policy
            .run("record:a", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(TransportError::Status {
                        status: 500,
                        body: String::new(),
                    })
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.seconds().is_empty());
    }

    #[tokio::test]
    async fn test_connection_errors_are_retried() {
        let (policy, sleeper) = policy();
        let calls = AtomicU32::new(0);
        let result = policy
            .run("fileop", || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Err(TransportError::Connect("connection reset".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(sleeper.seconds(), vec![1.0]);
    }
}
