//! External system integrations for MomConnect.
//!
//! - [`jembi`] - health information exchange (registration documents)
//! - [`vumi`] - Vumi Go contacts API and HTTP API metrics
//! - [`store`] - local persistence of registrations and subscriptions
//!
//! # Design Pattern
//!
//! Each integration sits behind an async trait so the core can run against
//! the HTTP clients in production and against in-process stand-ins in dry
//! runs and tests.
//!
//! ```rust,no_run
//! use momconnect::adapters::jembi::JembiClient;
//! use momconnect::adapters::vumi::HttpContactsClient;
//! use momconnect::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("momconnect.toml")?;
//! let jembi = JembiClient::new(&config.jembi)?;
//! let contacts = HttpContactsClient::new(&config.vumi)?;
//! # Ok(())
//! # }
//! ```

pub mod jembi;
pub mod store;
pub mod vumi;

use crate::domain::{MomConnectError, Result};
use url::Url;

/// Parses an API root so relative paths join beneath it
///
/// `Url::join` replaces the last segment unless the base ends with `/`.
pub(crate) fn api_root(raw: &str) -> Result<Url> {
    let mut root = raw.trim().to_string();
    if !root.ends_with('/') {
        root.push('/');
    }
    Url::parse(&root)
        .map_err(|e| MomConnectError::Configuration(format!("Invalid URL '{raw}': {e}")))
}
