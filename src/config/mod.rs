//! Configuration management for MomConnect.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `MOMCONNECT_*`
//! environment overrides and per-section validation.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run switch
//! - [`JembiConfig`] - health information exchange endpoint and credentials
//! - [`VumiConfig`] - contacts API and HTTP (metrics) API
//! - [`MetricsConfig`] - metric name prefix and switch
//! - [`SubscriptionConfig`] - delivery rate to schedule id table
//! - [`JobsConfig`] - retry policy and per-attempt time limit
//! - [`LoggingConfig`] - rolling JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [jembi]
//! base_url = "https://jembi.example.org/ws/rest/v1"
//! username = "momconnect"
//! password = "${JEMBI_PASSWORD}"
//!
//! [vumi]
//! auth_token = "${VUMI_GO_API_TOKEN}"
//! account_key = "acc"
//! conversation_key = "conv"
//! conversation_token = "${VUMI_GO_ACCOUNT_TOKEN}"
//!
//! [metrics]
//! env = "prd"
//! ```
//!
//! ```rust,no_run
//! use momconnect::config::load_config;
//!
//! match load_config("momconnect.toml") {
//!     Ok(config) => println!("Metric prefix: {}", config.metrics.env),
//!     Err(e) => eprintln!("Configuration error: {e}"),
//! }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, Environment, JembiConfig, JobsConfig, LoggingConfig, MetricsConfig,
    MomConnectConfig, SubscriptionConfig, VumiConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
