//! Result type alias for MomConnect

use super::errors::MomConnectError;

/// Result type alias for MomConnect operations
///
/// # Examples
///
/// ```
/// use momconnect::domain::result::Result;
/// use momconnect::domain::errors::MomConnectError;
///
/// fn failing_function() -> Result<()> {
///     Err(MomConnectError::Validation("mom_msisdn is required".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MomConnectError>;
