//! Error context extension trait
//!
//! `anyhow::Context` for library code that keeps `MomConnectError`.
//! Context wraps into [`MomConnectError::Other`], which drops any upstream
//! status, so avoid it on errors that a retry policy still has to classify.
//!
//! # Examples
//!
//! ```rust
//! use momconnect::domain::Result;
//! use momconnect::domain::context::ResultExt;
//!
//! fn read_snapshot(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read state snapshot: {path}"))
//! }
//! ```

use crate::domain::errors::MomConnectError;
use crate::domain::result::Result;

/// Adds `.context()` and `.with_context()` to any result whose error
/// converts into `MomConnectError`
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add lazily computed context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MomConnectError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| MomConnectError::Other(format!("{context}: {}", e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let base_error = e.into();
            MomConnectError::Other(format!("{}: {base_error}", f()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::VumiError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(MomConnectError::Store("snapshot locked".to_string()));
        let err = result.context("Failed to save state").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to save state"));
        assert!(msg.contains("snapshot locked"));
    }

    #[test]
    fn test_with_context_is_lazy_on_ok() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let result: Result<u32> = Ok(7);
        let value = result
            .with_context(|| {
                flag.store(true, Ordering::SeqCst);
                "never"
            })
            .unwrap();
        assert_eq!(value, 7);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_context_on_io_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "state.json missing",
        ));
        let err = result.context("Loading state").unwrap_err();
        assert!(err.to_string().contains("state.json missing"));
    }

    #[test]
    fn test_context_drops_upstream_status() {
        let result: std::result::Result<(), VumiError> = Err(VumiError::from_status(503, "down"));
        let err = result.context("Updating contact").unwrap_err();
        assert_eq!(err.upstream_status(), None);
    }
}
