use std::time::Duration;

use crate::{Result, RetryPolicy};

/// Configures timeouts, retry behavior and the target environment.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Timeout for each individual attempt.
    pub timeout: Duration,
    /// Deployment environment label, e.g. `"Prod"` or `"Dev"`.
    pub environment: String,
    /// Retry behavior for transient failures.
    pub retry_policy: RetryPolicy,
    /// Optional ceiling on one call including every retry and backoff.
    ///
    /// `None` leaves the total latency bounded only by the retry policy.
    pub overall_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            environment: "Prod".to_owned(),
            retry_policy: RetryPolicy::default(),
            overall_timeout: None,
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }

    pub fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(crate::GdprError::Config(
                "timeout must be greater than zero".to_owned(),
            ));
        }
        if self.overall_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(crate::GdprError::Config(
                "overall_timeout must be greater than zero when set".to_owned(),
            ));
        }
        self.retry_policy.validate()
    }
}
