//! `init` command: writes a sample configuration file

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(short, long, default_value = "momconnect.toml")]
    pub output: String,

    /// Include every section with commented defaults
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let contents = if self.with_examples {
            sample_config_with_examples()
        } else {
            sample_config()
        };

        match fs::write(&self.output, contents) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set JEMBI_PASSWORD, VUMI_GO_API_TOKEN and VUMI_GO_ACCOUNT_TOKEN (or use a .env file)");
                println!("  2. Check the file: momconnect validate-config --config {}", self.output);
                println!("  3. Try a registration: momconnect register --input reg.json --dry-run");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

fn sample_config() -> &'static str {
    r#"# MomConnect configuration
environment = "development"

[application]
log_level = "info"
dry_run = false

[jembi]
base_url = "https://jembi.example.org/ws/rest/v1"
username = "momconnect"
password = "${JEMBI_PASSWORD}"
send_xml = false

[vumi]
contacts_api_url = "https://go.vumi.org/api/v1/go"
auth_token = "${VUMI_GO_API_TOKEN}"
http_api_url = "https://go.vumi.org/api/v1/go/http_api_nostream"
account_key = "replace-with-account-key"
conversation_key = "replace-with-conversation-key"
conversation_token = "${VUMI_GO_ACCOUNT_TOKEN}"

[metrics]
env = "qa"
"#
}

fn sample_config_with_examples() -> &'static str {
    r#"# MomConnect configuration
#
# Values of the form ${NAME} are read from the environment (or .env).
# Any setting can be overridden with MOMCONNECT_<SECTION>_<KEY>.

# development | staging | production
environment = "development"

[application]
# trace, debug, info, warn, error
log_level = "info"
# Post nothing: contacts, Jembi and metrics go to in-process stand-ins
dry_run = false

[jembi]
base_url = "https://jembi.example.org/ws/rest/v1"
username = "momconnect"
password = "${JEMBI_PASSWORD}"
# Must stay true in production
tls_verify = true
timeout_seconds = 30
# Also post the XML document dossier for mother registrations
send_xml = false
dossier_namespace = "net.ihe"

[vumi]
contacts_api_url = "https://go.vumi.org/api/v1/go"
auth_token = "${VUMI_GO_API_TOKEN}"
http_api_url = "https://go.vumi.org/api/v1/go/http_api_nostream"
account_key = "replace-with-account-key"
conversation_key = "replace-with-conversation-key"
conversation_token = "${VUMI_GO_ACCOUNT_TOKEN}"
timeout_seconds = 30

[metrics]
# First segment of every metric name
env = "qa"
enabled = true

[subscription]
default_language = "en"

[subscription.rates]
daily = 1
one_per_week = 2
two_per_week = 3
three_per_week = 4
four_per_week = 5
five_per_week = 6

[jobs]
# Retries after the first attempt
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0
# Per attempt; a timed out job is not retried
time_limit_seconds = 10
retryable_status_min = 501
retryable_status_max = 598

[logging]
local_enabled = false
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    fn with_secrets() {
        std::env::set_var("JEMBI_PASSWORD", "pw");
        std::env::set_var("VUMI_GO_API_TOKEN", "token");
        std::env::set_var("VUMI_GO_ACCOUNT_TOKEN", "account-token");
    }

    #[test]
    fn test_samples_parse() {
        with_secrets();
        let minimal = parse_config(sample_config()).unwrap();
        let full = parse_config(sample_config_with_examples()).unwrap();
        assert_eq!(minimal.jobs.max_retries, full.jobs.max_retries);
        assert_eq!(full.subscription.schedule_for("three_per_week"), Some(4));
        assert_eq!(full.jobs.retryable_statuses(), 501..=598);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("momconnect.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }
}
