//! Metric senders

use super::models::Metric;
use crate::adapters::api_root;
use crate::config::VumiConfig;
use crate::domain::{MomConnectError, Result, VumiError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Destination for metric data points
#[async_trait]
pub trait MetricSender: Send + Sync {
    async fn fire_metric(&self, metric: &Metric) -> Result<()>;
}

/// Vumi Go HTTP API sender
///
/// `PUT {http_api_url}/{conversation_key}/metrics.json` with basic auth of
/// account key and conversation token.
pub struct HttpMetricSender {
    client: Client,
    url: Url,
    auth_header: String,
}

impl HttpMetricSender {
    pub fn new(config: &VumiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                MomConnectError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let url = api_root(&config.http_api_url)?
            .join(&format!("{}/metrics.json", config.conversation_key))
            .map_err(|e| MomConnectError::Configuration(format!("Invalid metrics URL: {e}")))?;

        let credentials = format!(
            "{}:{}",
            config.account_key,
            config.conversation_token.expose_secret().as_ref()
        );
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        );

        Ok(Self {
            client,
            url,
            auth_header,
        })
    }
}

#[async_trait]
impl MetricSender for HttpMetricSender {
    async fn fire_metric(&self, metric: &Metric) -> Result<()> {
        let body = serde_json::json!([metric.to_wire()]);
        let response = self
            .client
            .put(self.url.clone())
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| VumiError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VumiError::from_status(status.as_u16(), text).into());
        }
        Ok(())
    }
}

/// Sender that logs each metric and keeps a copy
///
/// Used for dry runs and as the recording sender in tests.
#[derive(Debug, Default)]
pub struct LoggingMetricSender {
    records: Mutex<Vec<Metric>>,
}

impl LoggingMetricSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every metric fired so far, oldest first
    pub fn records(&self) -> Vec<Metric> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Names of the metrics fired so far
    pub fn names(&self) -> Vec<String> {
        self.records().into_iter().map(|m| m.name).collect()
    }
}

#[async_trait]
impl MetricSender for LoggingMetricSender {
    async fn fire_metric(&self, metric: &Metric) -> Result<()> {
        tracing::info!("{}", metric);
        match self.records.lock() {
            Ok(mut records) => records.push(metric.clone()),
            Err(poisoned) => poisoned.into_inner().push(metric.clone()),
        }
        Ok(())
    }
}
