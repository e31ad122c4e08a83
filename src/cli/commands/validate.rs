//! `validate-config` command

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well; a failure here is either kind
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Jembi: {} (user {})", config.jembi.base_url, config.jembi.username);
        println!("  Jembi XML Dossier: {}", config.jembi.send_xml);
        println!("  Contacts API: {}", config.vumi.contacts_api_url);
        println!(
            "  Metrics: {} (prefix '{}')",
            if config.metrics.enabled { "on" } else { "off" },
            config.metrics.env
        );
        println!(
            "  Jobs: {} retries, {}s per attempt, retrying {:?}",
            config.jobs.max_retries,
            config.jobs.time_limit_seconds,
            config.jobs.retryable_statuses()
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/momconnect.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[jembi]
base_url = "http://jembi.test/ws/rest/v1"
username = "user"
password = "pass"

[vumi]
auth_token = "token"
account_key = "acc"
conversation_key = "conv"
conversation_token = "convtoken"
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
