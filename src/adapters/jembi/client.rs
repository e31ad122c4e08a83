//! Jembi HTTP client

use super::models::{NurseRegistrationDocument, RegistrationDocument};
use crate::adapters::api_root;
use crate::config::JembiConfig;
use crate::domain::{JembiError, MomConnectError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Operations against the health information exchange
#[async_trait]
pub trait JembiApi: Send + Sync {
    /// Posts a mother registration; returns the response body
    async fn post_subscription(&self, document: &RegistrationDocument) -> Result<String>;

    /// Posts a nurse registration; returns the response body
    async fn post_nurse_subscription(&self, document: &NurseRegistrationDocument)
        -> Result<String>;

    /// Posts a document dossier; returns the response body
    async fn post_dossier(&self, xml: String) -> Result<String>;
}

/// Basic-auth client for Jembi's REST endpoints
///
/// # Example
///
/// ```no_run
/// use momconnect::adapters::jembi::JembiClient;
/// use momconnect::config::JembiConfig;
///
/// # fn example() -> momconnect::domain::Result<()> {
/// let config = JembiConfig::new("https://jembi.example.org/ws/rest/v1", "user", "pass");
/// let client = JembiClient::new(&config)?;
/// # Ok(())
/// # }
/// ```
pub struct JembiClient {
    client: Client,
    base_url: Url,
    auth_header: String,
    dossier_namespace: String,
}

impl JembiClient {
    /// Creates a client from the `[jembi]` section
    ///
    /// # Errors
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &JembiConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10));

        if !config.tls_verify {
            tracing::warn!("Jembi TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            MomConnectError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let credentials = format!(
            "{}:{}",
            config.username,
            config.password.expose_secret().as_ref()
        );
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        );

        Ok(Self {
            client,
            base_url: api_root(&config.base_url)?,
            auth_header,
            dossier_namespace: config.dossier_namespace.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MomConnectError::Configuration(format!("Invalid Jembi path '{path}': {e}")))
    }

    async fn post(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<String> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "Posting to Jembi");

        let response = self
            .client
            .post(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| JembiError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(JembiError::from_status(status.as_u16(), text).into());
        }
        Ok(text)
    }
}

#[async_trait]
impl JembiApi for JembiClient {
    async fn post_subscription(&self, document: &RegistrationDocument) -> Result<String> {
        let body = serde_json::to_vec(document)?;
        self.post("json/subscription", "application/json", body)
            .await
    }

    async fn post_nurse_subscription(
        &self,
        document: &NurseRegistrationDocument,
    ) -> Result<String> {
        let body = serde_json::to_vec(document)?;
        self.post("nc/subscription", "application/json", body).await
    }

    async fn post_dossier(&self, xml: String) -> Result<String> {
        let path = format!("registration/{}/DocumentDossier", self.dossier_namespace);
        self.post(&path, "application/xml", xml.into_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_nest_under_base_path() {
        let config = JembiConfig::new("http://test/v2", "user", "pass");
        let client = JembiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("json/subscription").unwrap().as_str(),
            "http://test/v2/json/subscription"
        );
        assert_eq!(
            client
                .endpoint("registration/net.ihe/DocumentDossier")
                .unwrap()
                .as_str(),
            "http://test/v2/registration/net.ihe/DocumentDossier"
        );
    }

    #[test]
    fn test_basic_auth_header() {
        let config = JembiConfig::new("http://test/v2", "user", "pass");
        let client = JembiClient::new(&config).unwrap();
        assert_eq!(client.auth_header, "Basic dXNlcjpwYXNz");
    }
}
