//! Configuration schema types

use crate::config::{secret_string, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use url::Url;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Root configuration, mapped from the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomConnectConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Health information exchange endpoint
    pub jembi: JembiConfig,

    /// Contacts API and HTTP (metrics) API
    pub vumi: VumiConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub subscription: SubscriptionConfig,

    #[serde(default)]
    pub jobs: JobsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MomConnectConfig {
    /// Validates every section
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.jembi.validate(&self.environment)?;
        self.vumi.validate()?;
        self.metrics.validate()?;
        self.subscription.validate()?;
        self.jobs.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Keep registrations local; contacts and metrics go to in-process stand-ins
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Jembi connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JembiConfig {
    /// Base URL; documents go to `{base_url}/json/subscription` and friends
    pub base_url: String,

    pub username: String,

    /// Stored securely in memory and zeroized on drop
    pub password: SecretString,

    /// TLS certificate verification. Cannot be disabled in production.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Also post the XML document dossier for mother registrations
    #[serde(default)]
    pub send_xml: bool,

    /// Namespace segment of the dossier path
    #[serde(default = "default_dossier_namespace")]
    pub dossier_namespace: String,
}

impl JembiConfig {
    /// Settings with defaults for everything but the endpoint and credentials
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: secret_string(password.into()),
            tls_verify: true,
            timeout_seconds: default_timeout_seconds(),
            send_xml: false,
            dossier_namespace: default_dossier_namespace(),
        }
    }

    fn validate(&self, environment: &Environment) -> Result<(), String> {
        validate_http_url("jembi.base_url", &self.base_url)?;

        if self.username.trim().is_empty() {
            return Err("jembi.username cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("jembi.password cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("jembi.timeout_seconds must be > 0".to_string());
        }
        if self.dossier_namespace.trim().is_empty() || self.dossier_namespace.contains('/') {
            return Err("jembi.dossier_namespace must be a single path segment".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'jembi.tls_verify = true' or run with environment = \"development\"."
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Vumi Go contacts and HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VumiConfig {
    /// Contacts API root, e.g. `https://go.vumi.org/api/v1/go`
    #[serde(default = "default_contacts_api_url")]
    pub contacts_api_url: String,

    /// Bearer token for the contacts API
    pub auth_token: SecretString,

    /// HTTP API root used for metrics
    #[serde(default = "default_http_api_url")]
    pub http_api_url: String,

    pub account_key: String,

    pub conversation_key: String,

    /// HTTP API token; the basic-auth password alongside `account_key`
    pub conversation_token: SecretString,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl VumiConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url("vumi.contacts_api_url", &self.contacts_api_url)?;
        validate_http_url("vumi.http_api_url", &self.http_api_url)?;

        if self.auth_token.expose_secret().is_empty() {
            return Err("vumi.auth_token cannot be empty".to_string());
        }
        if self.account_key.trim().is_empty() {
            return Err("vumi.account_key cannot be empty".to_string());
        }
        if self.conversation_key.trim().is_empty() {
            return Err("vumi.conversation_key cannot be empty".to_string());
        }
        if self.conversation_token.expose_secret().is_empty() {
            return Err("vumi.conversation_token cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("vumi.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Metric naming and switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// First segment of every metric name (`qa`, `prd`, ...)
    #[serde(default = "default_metric_env")]
    pub env: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.env.trim().is_empty() || self.env.contains(char::is_whitespace) {
            return Err("metrics.env must be a non-empty name without whitespace".to_string());
        }
        Ok(())
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            env: default_metric_env(),
            enabled: true,
        }
    }
}

/// Subscription planning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Delivery rate name to schedule id
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<String, u64>,

    /// Language for subscriptions whose registration carries none (nurses)
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl SubscriptionConfig {
    /// Schedule id for a rate name
    pub fn schedule_for(&self, rate: &str) -> Option<u64> {
        self.rates.get(rate).copied()
    }

    fn validate(&self) -> Result<(), String> {
        for rate in crate::core::plan::RATE_NAMES {
            if !self.rates.contains_key(*rate) {
                return Err(format!("subscription.rates is missing '{rate}'"));
            }
        }
        if self.default_language.trim().is_empty() {
            return Err("subscription.default_language cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            default_language: default_language(),
        }
    }
}

/// Background job execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Hard wall-clock limit per attempt
    #[serde(default = "default_time_limit_seconds")]
    pub time_limit_seconds: u64,

    /// Lowest HTTP status that is retried
    #[serde(default = "default_retryable_status_min")]
    pub retryable_status_min: u16,

    /// Highest HTTP status that is retried
    #[serde(default = "default_retryable_status_max")]
    pub retryable_status_max: u16,
}

impl JobsConfig {
    pub fn retryable_statuses(&self) -> RangeInclusive<u16> {
        self.retryable_status_min..=self.retryable_status_max
    }

    fn validate(&self) -> Result<(), String> {
        if self.time_limit_seconds == 0 {
            return Err("jobs.time_limit_seconds must be > 0".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("jobs.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("jobs.initial_delay_ms cannot exceed jobs.max_delay_ms".to_string());
        }
        if self.retryable_status_min > self.retryable_status_max {
            return Err(
                "jobs.retryable_status_min cannot exceed jobs.retryable_status_max".to_string(),
            );
        }
        if !(100..=599).contains(&self.retryable_status_min)
            || !(100..=599).contains(&self.retryable_status_max)
        {
            return Err("jobs retryable status bounds must be HTTP status codes".to_string());
        }
        Ok(())
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            time_limit_seconds: default_time_limit_seconds(),
            retryable_status_min: default_retryable_status_min(),
            retryable_status_max: default_retryable_status_max(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// daily, hourly or never
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    let parsed = Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_dossier_namespace() -> String {
    "net.ihe".to_string()
}

fn default_contacts_api_url() -> String {
    "https://go.vumi.org/api/v1/go".to_string()
}

fn default_http_api_url() -> String {
    "https://go.vumi.org/api/v1/go/http_api_nostream".to_string()
}

fn default_metric_env() -> String {
    "qa".to_string()
}

fn default_rates() -> BTreeMap<String, u64> {
    [
        ("daily", 1),
        ("one_per_week", 2),
        ("two_per_week", 3),
        ("three_per_week", 4),
        ("four_per_week", 5),
        ("five_per_week", 6),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), id))
    .collect()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_time_limit_seconds() -> u64 {
    10
}

fn default_retryable_status_min() -> u16 {
    501
}

fn default_retryable_status_max() -> u16 {
    598
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vumi() -> VumiConfig {
        VumiConfig {
            contacts_api_url: default_contacts_api_url(),
            auth_token: secret_string("token".to_string()),
            http_api_url: default_http_api_url(),
            account_key: "acc".to_string(),
            conversation_key: "conv".to_string(),
            conversation_token: secret_string("convtoken".to_string()),
            timeout_seconds: 30,
        }
    }

    fn config() -> MomConnectConfig {
        MomConnectConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Development,
            jembi: JembiConfig::new("http://jembi.example.org/ws/rest/v1", "user", "pass"),
            vumi: vumi(),
            metrics: MetricsConfig::default(),
            subscription: SubscriptionConfig::default(),
            jobs: JobsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_default_rates() {
        let sub = SubscriptionConfig::default();
        assert_eq!(sub.schedule_for("daily"), Some(1));
        assert_eq!(sub.schedule_for("three_per_week"), Some(4));
        assert_eq!(sub.schedule_for("five_per_week"), Some(6));
        assert_eq!(sub.schedule_for("hourly"), None);
    }

    #[test]
    fn test_default_retryable_range_excludes_500_and_599() {
        let range = JobsConfig::default().retryable_statuses();
        assert!(!range.contains(&500));
        assert!(range.contains(&501));
        assert!(range.contains(&531));
        assert!(range.contains(&598));
        assert!(!range.contains(&599));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut cfg = config();
        cfg.jembi.base_url = "ftp://jembi.example.org".to_string();
        assert!(cfg.validate().unwrap_err().contains("jembi.base_url"));
    }

    #[test]
    fn test_rejects_tls_off_in_production() {
        let mut cfg = config();
        cfg.environment = Environment::Production;
        cfg.jembi.tls_verify = false;
        assert!(cfg.validate().unwrap_err().contains("TLS"));
    }

    #[test]
    fn test_rejects_missing_rate() {
        let mut cfg = config();
        cfg.subscription.rates.remove("daily");
        assert!(cfg.validate().unwrap_err().contains("daily"));
    }

    #[test]
    fn test_rejects_inverted_status_range() {
        let mut cfg = config();
        cfg.jobs.retryable_status_min = 599;
        cfg.jobs.retryable_status_max = 500;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_secret() {
        let mut cfg = config();
        cfg.vumi.auth_token = secret_string(String::new());
        assert!(cfg.validate().unwrap_err().contains("vumi.auth_token"));
    }
}
