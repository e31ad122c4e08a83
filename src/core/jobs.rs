//! Background job execution with bounded retry
//!
//! Business operations are plain async closures. [`JobRunner`] applies a
//! [`RetryPolicy`] and a hard per-attempt time limit around them and reports
//! the outcome as a [`JobError`] the caller can turn into metrics.

use crate::config::JobsConfig;
use crate::domain::{JobError, MomConnectError, Result};
use crate::{log_job_complete, log_job_start, log_retry_attempt};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// When and how often a failed attempt is repeated
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upstream statuses worth retrying
    pub retryable_statuses: RangeInclusive<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &JobsConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            retryable_statuses: config.retryable_statuses(),
        }
    }

    /// Same policy with every backoff delay set to zero
    pub fn without_delay(mut self) -> Self {
        self.initial_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Connection failures and upstream statuses inside the retryable range
    pub fn is_retryable(&self, error: &MomConnectError) -> bool {
        if error.is_connection_failure() {
            return true;
        }
        error
            .upstream_status()
            .is_some_and(|status| self.retryable_statuses.contains(&status))
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&JobsConfig::default())
    }
}

/// Runs job bodies under a retry policy and a time limit
#[derive(Debug, Clone)]
pub struct JobRunner {
    policy: RetryPolicy,
    time_limit: Duration,
}

impl JobRunner {
    pub fn new(policy: RetryPolicy, time_limit: Duration) -> Self {
        Self { policy, time_limit }
    }

    pub fn from_config(config: &JobsConfig) -> Self {
        Self::new(
            RetryPolicy::from_config(config),
            Duration::from_secs(config.time_limit_seconds),
        )
    }

    /// Runs `operation` until it succeeds, fails permanently or runs out of attempts
    ///
    /// Each attempt is cancelled once it exceeds the time limit; a timed out
    /// job is not retried.
    ///
    /// # Errors
    ///
    /// - `JobError::RetriesExhausted` when every attempt hit a retryable error
    /// - `JobError::Failed` on the first non-retryable error
    /// - `JobError::TimedOut` when an attempt ran past the time limit
    pub async fn run<T, F, Fut>(
        &self,
        job: &str,
        record_id: impl Display,
        mut operation: F,
    ) -> std::result::Result<T, JobError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        log_job_start!(job, record_id);
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match tokio::time::timeout(self.time_limit, operation()).await {
                Ok(Ok(value)) => {
                    log_job_complete!(job, attempt, started.elapsed());
                    return Ok(value);
                }
                Ok(Err(error)) => error,
                Err(_) => {
                    tracing::error!(
                        job = job,
                        record_id = %record_id,
                        attempt = attempt,
                        limit_secs = self.time_limit.as_secs(),
                        "Job exceeded its time limit"
                    );
                    return Err(JobError::TimedOut {
                        job: job.to_string(),
                        limit_secs: self.time_limit.as_secs(),
                    });
                }
            };

            if !self.policy.is_retryable(&error) {
                tracing::error!(job = job, record_id = %record_id, error = %error, "Job failed");
                return Err(JobError::Failed {
                    job: job.to_string(),
                    source: error,
                });
            }

            if attempt >= max_attempts {
                tracing::error!(
                    job = job,
                    record_id = %record_id,
                    attempts = attempt,
                    error = %error,
                    "Job failed after exhausting retries"
                );
                return Err(JobError::RetriesExhausted {
                    job: job.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            log_retry_attempt!(attempt + 1, max_attempts, error);
            tokio::time::sleep(self.policy.delay_for(attempt)).await;
        }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::from_config(&JobsConfig::default())
    }
}

/// Result of a job whose record may have disappeared
///
/// `Ok(None)` means the record was missing; the job ended without retrying.
pub type JobResult<T> = std::result::Result<Option<T>, JobError>;

/// Serializable summary of a [`JobResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    RecordMissing,
    Failed { error: String },
    TimedOut,
}

impl JobStatus {
    pub fn of<T>(result: &JobResult<T>) -> Self {
        match result {
            Ok(Some(_)) => JobStatus::Completed,
            Ok(None) => JobStatus::RecordMissing,
            Err(JobError::TimedOut { .. }) => JobStatus::TimedOut,
            Err(e) => JobStatus::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}
