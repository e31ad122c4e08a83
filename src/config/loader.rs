//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MomConnectConfig;
use super::secret_string;
use crate::domain::errors::MomConnectError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`MomConnectConfig`]
/// 4. Applies `MOMCONNECT_*` environment overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns `MomConnectError::Configuration` if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use momconnect::config::loader::load_config;
///
/// let config = load_config("momconnect.toml").expect("Failed to load config");
/// println!("Jembi at {}", config.jembi.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MomConnectConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MomConnectError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MomConnectError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text. Same steps as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<MomConnectConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: MomConnectConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        MomConnectError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied through untouched.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MomConnectError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(MomConnectError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env(name).and_then(|v| v.parse().ok())
}

/// Applies `MOMCONNECT_<SECTION>_<KEY>` overrides
///
/// Values that fail to parse are ignored.
fn apply_env_overrides(config: &mut MomConnectConfig) {
    if let Some(val) = env("MOMCONNECT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("MOMCONNECT_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    if let Some(val) = env("MOMCONNECT_JEMBI_BASE_URL") {
        config.jembi.base_url = val;
    }
    if let Some(val) = env("MOMCONNECT_JEMBI_USERNAME") {
        config.jembi.username = val;
    }
    if let Some(val) = env("MOMCONNECT_JEMBI_PASSWORD") {
        config.jembi.password = secret_string(val);
    }
    if let Some(val) = env_parsed("MOMCONNECT_JEMBI_TLS_VERIFY") {
        config.jembi.tls_verify = val;
    }
    if let Some(val) = env_parsed("MOMCONNECT_JEMBI_SEND_XML") {
        config.jembi.send_xml = val;
    }

    if let Some(val) = env("MOMCONNECT_VUMI_CONTACTS_API_URL") {
        config.vumi.contacts_api_url = val;
    }
    if let Some(val) = env("MOMCONNECT_VUMI_AUTH_TOKEN") {
        config.vumi.auth_token = secret_string(val);
    }
    if let Some(val) = env("MOMCONNECT_VUMI_HTTP_API_URL") {
        config.vumi.http_api_url = val;
    }
    if let Some(val) = env("MOMCONNECT_VUMI_ACCOUNT_KEY") {
        config.vumi.account_key = val;
    }
    if let Some(val) = env("MOMCONNECT_VUMI_CONVERSATION_KEY") {
        config.vumi.conversation_key = val;
    }
    if let Some(val) = env("MOMCONNECT_VUMI_CONVERSATION_TOKEN") {
        config.vumi.conversation_token = secret_string(val);
    }

    if let Some(val) = env("MOMCONNECT_METRICS_ENV") {
        config.metrics.env = val;
    }
    if let Some(val) = env_parsed("MOMCONNECT_METRICS_ENABLED") {
        config.metrics.enabled = val;
    }

    if let Some(val) = env_parsed("MOMCONNECT_JOBS_MAX_RETRIES") {
        config.jobs.max_retries = val;
    }
    if let Some(val) = env_parsed("MOMCONNECT_JOBS_TIME_LIMIT_SECONDS") {
        config.jobs.time_limit_seconds = val;
    }

    if let Some(val) = env_parsed("MOMCONNECT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("MOMCONNECT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
