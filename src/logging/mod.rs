//! Logging and observability
//!
//! Structured `tracing` output to the console and, optionally, rolling JSON
//! files. The macros below keep job lifecycle events uniform across the
//! dispatcher and the synchronizers.
//!
//! # Example
//!
//! ```no_run
//! use momconnect::logging::init_logging;
//! use momconnect::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(registration_id = 1, "Registration stored");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a background job
///
/// # Example
///
/// ```no_run
/// use momconnect::log_job_start;
///
/// log_job_start!("jembi_post_json", 42);
/// ```
#[macro_export]
macro_rules! log_job_start {
    ($job:expr, $record_id:expr) => {
        tracing::info!(job = $job, record_id = %$record_id, "Starting job");
    };
}

/// Log a finished background job
///
/// # Example
///
/// ```no_run
/// use momconnect::log_job_complete;
/// use std::time::Duration;
///
/// log_job_complete!("update_create_vumi_contact", 2, Duration::from_millis(120));
/// ```
#[macro_export]
macro_rules! log_job_complete {
    ($job:expr, $attempts:expr, $duration:expr) => {
        tracing::info!(
            job = $job,
            attempts = $attempts,
            duration_ms = $duration.as_millis() as u64,
            "Job completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use momconnect::log_error_with_context;
/// use momconnect::domain::MomConnectError;
///
/// let error = MomConnectError::NotFound("registration 7".to_string());
/// log_error_with_context!(&error, "Missing Registration object");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(error = %$error, context = $context, "Error occurred");
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use momconnect::log_retry_attempt;
///
/// log_retry_attempt!(2, 4, "Server error: 531");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
