//! Domain error types
//!
//! This module defines the error hierarchy for MomConnect. Upstream errors keep
//! the HTTP status so retry policies can classify them without touching
//! third-party client types.

use thiserror::Error;

/// Main MomConnect error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MomConnectError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Registration data violates a field-combination rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Jembi (health information exchange) errors
    #[error("Jembi error: {0}")]
    Jembi(#[from] JembiError),

    /// Vumi Go (contacts and metrics) errors
    #[error("Vumi Go error: {0}")]
    Vumi(#[from] VumiError),

    /// Subscription planning errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// A background job gave up
    #[error("Job error: {0}")]
    Job(Box<JobError>),

    /// Local persistence errors
    #[error("Store error: {0}")]
    Store(String),

    /// A referenced local record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl MomConnectError {
    /// HTTP status reported by an upstream service, if this error carries one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            MomConnectError::Jembi(e) => e.status(),
            MomConnectError::Vumi(e) => e.status(),
            MomConnectError::Job(e) => e.upstream_status(),
            _ => None,
        }
    }

    /// Whether the request never reached the upstream service
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            MomConnectError::Jembi(JembiError::ConnectionFailed(_))
                | MomConnectError::Vumi(VumiError::ConnectionFailed(_))
        )
    }
}

/// Jembi-specific errors
///
/// Errors that occur when posting registration documents to Jembi.
#[derive(Debug, Error)]
pub enum JembiError {
    /// Failed to connect to Jembi
    #[error("Failed to connect to Jembi: {0}")]
    ConnectionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Document could not be built
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl JembiError {
    /// Build an error from a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            JembiError::ServerError { status, message }
        } else {
            JembiError::ClientError { status, message }
        }
    }

    /// HTTP status, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            JembiError::ServerError { status, .. } | JembiError::ClientError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Vumi Go-specific errors
///
/// Errors from the contacts API and the HTTP metrics API.
#[derive(Debug, Error)]
pub enum VumiError {
    /// Failed to connect to Vumi Go
    #[error("Failed to connect to Vumi Go: {0}")]
    ConnectionFailed(String),

    /// The contacts API has no contact for this lookup
    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    /// Group lookup failed
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl VumiError {
    /// Build an error from a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            VumiError::ServerError { status, message }
        } else {
            VumiError::ClientError { status, message }
        }
    }

    /// HTTP status, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            VumiError::ServerError { status, .. } | VumiError::ClientError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Subscription planning errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Due date string is not `YYYY-MM-DD`
    #[error("Invalid estimated due date '{0}': expected YYYY-MM-DD")]
    InvalidDueDate(String),

    /// Clinic registrations need a due date to pick a band
    #[error("Clinic registrations require a weeks-pregnant value")]
    MissingWeeks,

    /// No band of the clinic plan table covers this week
    #[error("No subscription plan covers week {weeks} of pregnancy")]
    NoPlanForWeek { weeks: u32 },

    /// A rate name has no configured schedule
    #[error("No schedule configured for rate '{0}'")]
    UnknownRate(String),

    /// A message set short name is not loaded
    #[error("Unknown message set '{0}'")]
    UnknownMessageSet(String),
}

/// Background job failures
///
/// Returned by the job runner once it stops trying.
#[derive(Debug, Error)]
pub enum JobError {
    /// A retryable failure persisted through every attempt
    #[error("Job '{job}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        job: String,
        attempts: u32,
        #[source]
        source: MomConnectError,
    },

    /// A non-retryable failure
    #[error("Job '{job}' failed: {source}")]
    Failed {
        job: String,
        #[source]
        source: MomConnectError,
    },

    /// An attempt ran past the hard time limit
    #[error("Job '{job}' exceeded its time limit of {limit_secs}s")]
    TimedOut { job: String, limit_secs: u64 },
}

impl JobError {
    /// The underlying error, when the job failed rather than timed out
    pub fn source_error(&self) -> Option<&MomConnectError> {
        match self {
            JobError::RetriesExhausted { source, .. } | JobError::Failed { source, .. } => {
                Some(source)
            }
            JobError::TimedOut { .. } => None,
        }
    }

    /// HTTP status of the final upstream failure
    pub fn upstream_status(&self) -> Option<u16> {
        self.source_error().and_then(|e| e.upstream_status())
    }
}

impl From<JobError> for MomConnectError {
    fn from(err: JobError) -> Self {
        MomConnectError::Job(Box::new(err))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for MomConnectError {
    fn from(err: std::io::Error) -> Self {
        MomConnectError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MomConnectError {
    fn from(err: serde_json::Error) -> Self {
        MomConnectError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MomConnectError {
    fn from(err: toml::de::Error) -> Self {
        MomConnectError::Configuration(format!("TOML parse error: {err}"))
    }
}
