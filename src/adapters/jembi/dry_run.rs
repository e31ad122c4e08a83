//! Jembi stand-in for dry runs

use super::client::JembiApi;
use super::models::{NurseRegistrationDocument, RegistrationDocument};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Logs documents instead of posting them and keeps their JSON
#[derive(Debug, Default)]
pub struct LoggingJembi {
    posted: Mutex<Vec<String>>,
}

impl LoggingJembi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies "posted" so far, oldest first
    pub fn posted(&self) -> Vec<String> {
        self.posted
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn keep(&self, body: String) {
        match self.posted.lock() {
            Ok(mut posted) => posted.push(body),
            Err(poisoned) => poisoned.into_inner().push(body),
        }
    }
}

#[async_trait]
impl JembiApi for LoggingJembi {
    async fn post_subscription(&self, document: &RegistrationDocument) -> Result<String> {
        let body = serde_json::to_string(document)?;
        tracing::info!(cmsisdn = %document.cmsisdn, body = %body, "Dry run: Jembi json/subscription");
        self.keep(body);
        Ok("dry-run".to_string())
    }

    async fn post_nurse_subscription(
        &self,
        document: &NurseRegistrationDocument,
    ) -> Result<String> {
        let body = serde_json::to_string(document)?;
        tracing::info!(cmsisdn = %document.cmsisdn, body = %body, "Dry run: Jembi nc/subscription");
        self.keep(body);
        Ok("dry-run".to_string())
    }

    async fn post_dossier(&self, xml: String) -> Result<String> {
        tracing::info!(bytes = xml.len(), "Dry run: Jembi DocumentDossier");
        self.keep(xml);
        Ok("dry-run".to_string())
    }
}
