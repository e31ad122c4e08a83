//! External notification dispatch
//!
//! Posts registration documents to Jembi. Server-side failures in the
//! retryable range are retried by the [`JobRunner`]; the failure metric fires
//! once, when the runner gives up. A timed out job fires nothing.

pub mod documents;
pub mod dossier;

pub use documents::{nurse_registration_document, registration_document};
pub use dossier::build_dossier;

use crate::adapters::jembi::JembiApi;
use crate::adapters::store::Store;
use crate::core::clock::Clock;
use crate::core::jobs::{JobResult, JobRunner};
use crate::core::metrics::{MetricEmitter, MetricEvent};
use crate::domain::{
    JobError, MomConnectError, NurseRegistration, NurseRegistrationId, Registration,
    RegistrationId,
};
use crate::log_error_with_context;
use std::sync::Arc;

pub const JEMBI_POST_JSON: &str = "jembi_post_json";
pub const JEMBI_POST_XML: &str = "jembi_post_xml";
pub const NURSE_JEMBI_POST_JSON: &str = "nursereg_jembi_post_json";

/// Sends registrations to Jembi and counts the outcome
pub struct NotificationDispatcher {
    store: Arc<dyn Store>,
    jembi: Arc<dyn JembiApi>,
    metrics: Arc<MetricEmitter>,
    runner: JobRunner,
    clock: Arc<dyn Clock>,
    send_xml: bool,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        jembi: Arc<dyn JembiApi>,
        metrics: Arc<MetricEmitter>,
        runner: JobRunner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            jembi,
            metrics,
            runner,
            clock,
            send_xml: false,
        }
    }

    /// Also post the XML dossier for mother registrations
    pub fn with_xml(mut self, send_xml: bool) -> Self {
        self.send_xml = send_xml;
        self
    }

    async fn load_registration(
        &self,
        job: &str,
        id: RegistrationId,
    ) -> Result<Option<Registration>, JobError> {
        match self.store.get_registration(id).await {
            Ok(Some(registration)) => Ok(Some(registration)),
            Ok(None) => {
                let error = MomConnectError::NotFound(format!("registration {id}"));
                log_error_with_context!(error, "Missing Registration object");
                Ok(None)
            }
            Err(source) => Err(JobError::Failed {
                job: job.to_string(),
                source,
            }),
        }
    }

    async fn load_nurse_registration(
        &self,
        id: NurseRegistrationId,
    ) -> Result<Option<NurseRegistration>, JobError> {
        match self.store.get_nurse_registration(id).await {
            Ok(Some(registration)) => Ok(Some(registration)),
            Ok(None) => {
                let error = MomConnectError::NotFound(format!("nurse registration {id}"));
                log_error_with_context!(error, "Missing NurseReg object");
                Ok(None)
            }
            Err(source) => Err(JobError::Failed {
                job: NURSE_JEMBI_POST_JSON.to_string(),
                source,
            }),
        }
    }

    /// Fires `event(true)` on success and `event(false)` on failure; timeouts fire nothing
    fn count<T>(&self, result: &JobResult<T>, event: impl Fn(bool) -> MetricEvent<'static>) {
        match result {
            Ok(Some(_)) => self.metrics.record(event(true)),
            Ok(None) | Err(JobError::TimedOut { .. }) => {}
            Err(_) => self.metrics.record(event(false)),
        }
    }

    /// Posts the JSON registration document
    ///
    /// Returns the response body, or `None` when the registration does not exist.
    pub async fn post_registration_json(&self, id: RegistrationId) -> JobResult<String> {
        let Some(registration) = self.load_registration(JEMBI_POST_JSON, id).await? else {
            return Ok(None);
        };
        tracing::info!(registration_id = %id, "Compiling Jembi Json data");

        let document = registration_document(&registration, self.clock.now());
        let jembi = &self.jembi;
        let document = &document;
        let result = self
            .runner
            .run(JEMBI_POST_JSON, id, move || jembi.post_subscription(document))
            .await
            .map(Some);

        let authority = registration.authority;
        self.count(&result, |success| MetricEvent::JsonToJembi {
            authority,
            success,
        });
        result
    }

    /// Posts the XML document dossier
    pub async fn post_registration_dossier(&self, id: RegistrationId) -> JobResult<String> {
        let Some(registration) = self.load_registration(JEMBI_POST_XML, id).await? else {
            return Ok(None);
        };
        tracing::info!(registration_id = %id, "Compiling Jembi XML dossier");

        let authority = registration.authority;
        let document = registration_document(&registration, self.clock.now());
        let result = match build_dossier(&document) {
            Ok(xml) => {
                let jembi = &self.jembi;
                let xml = &xml;
                self.runner
                    .run(JEMBI_POST_XML, id, move || jembi.post_dossier(xml.clone()))
                    .await
                    .map(Some)
            }
            Err(e) => Err(JobError::Failed {
                job: JEMBI_POST_XML.to_string(),
                source: e.into(),
            }),
        };

        self.count(&result, |success| MetricEvent::DocToJembi {
            authority,
            success,
        });
        result
    }

    /// Posts the JSON document and, when enabled, the dossier
    pub async fn dispatch_registration(
        &self,
        id: RegistrationId,
    ) -> (JobResult<String>, Option<JobResult<String>>) {
        if self.send_xml {
            let (json, xml) = tokio::join!(
                self.post_registration_json(id),
                self.post_registration_dossier(id)
            );
            (json, Some(xml))
        } else {
            (self.post_registration_json(id).await, None)
        }
    }

    /// Posts the nurse registration document
    pub async fn post_nurse_registration_json(
        &self,
        id: NurseRegistrationId,
    ) -> JobResult<String> {
        let Some(registration) = self.load_nurse_registration(id).await? else {
            return Ok(None);
        };
        tracing::info!(nurse_registration_id = %id, "Compiling Jembi Json data");

        let document = nurse_registration_document(&registration, self.clock.now());
        let jembi = &self.jembi;
        let document = &document;
        let result = self
            .runner
            .run(NURSE_JEMBI_POST_JSON, id, move || {
                jembi.post_nurse_subscription(document)
            })
            .await
            .map(Some);

        self.count(&result, |success| MetricEvent::NurseJsonToJembi { success });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::jembi::{NurseRegistrationDocument, RegistrationDocument};
    use crate::adapters::store::{MemoryStore, RegistrationStore};
    use crate::adapters::vumi::LoggingMetricSender;
    use crate::config::MetricsConfig;
    use crate::core::clock::FixedClock;
    use crate::core::jobs::RetryPolicy;
    use crate::domain::{Authority, IdType, JembiError, RegistrationDraft, Result};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Jembi stand-in answering every post with a fixed status
    struct ScriptedJembi {
        status: u16,
        calls: AtomicU32,
        bodies: Mutex<Vec<String>>,
    }

    impl ScriptedJembi {
        fn new(status: u16) -> Self {
            Self {
                status,
                calls: AtomicU32::new(0),
                bodies: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, body: String) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body);
            if self.status < 300 {
                Ok("ok".to_string())
            } else {
                Err(JembiError::from_status(self.status, "scripted").into())
            }
        }
    }

    #[async_trait]
    impl JembiApi for ScriptedJembi {
        async fn post_subscription(&self, document: &RegistrationDocument) -> Result<String> {
            self.answer(serde_json::to_string(document)?)
        }

        async fn post_nurse_subscription(
            &self,
            document: &NurseRegistrationDocument,
        ) -> Result<String> {
            self.answer(serde_json::to_string(document)?)
        }

        async fn post_dossier(&self, xml: String) -> Result<String> {
            self.answer(xml)
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        jembi: Arc<ScriptedJembi>,
        sender: Arc<LoggingMetricSender>,
        metrics: Arc<MetricEmitter>,
        dispatcher: NotificationDispatcher,
    }

    fn harness(status: u16) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let jembi = Arc::new(ScriptedJembi::new(status));
        let sender = Arc::new(LoggingMetricSender::new());
        let metrics = Arc::new(MetricEmitter::new(sender.clone(), &MetricsConfig::default()));
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            jembi.clone(),
            metrics.clone(),
            JobRunner::new(RetryPolicy::default().without_delay(), Duration::from_secs(5)),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2013, 8, 19, 14, 48, 11).unwrap())),
        )
        .with_xml(true);
        Harness {
            store,
            jembi,
            sender,
            metrics,
            dispatcher,
        }
    }

    async fn store_personal(store: &MemoryStore) -> RegistrationId {
        let reg = RegistrationDraft {
            mom_msisdn: Some("+27001".to_string()),
            mom_id_type: Some(IdType::Passport),
            mom_id_no: Some("5551111".to_string()),
            mom_passport_origin: Some("zw".to_string()),
            mom_dob: Some("1980-09-15".to_string()),
            mom_lang: Some("en".to_string()),
            authority: Some(Authority::Personal),
            source: Some("Personal USSD".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        store.insert_registration(reg, Utc::now()).await.unwrap().id
    }

    #[tokio::test]
    async fn test_success_fires_success_metric() {
        let h = harness(201);
        let id = store_personal(&h.store).await;

        let body = h.dispatcher.post_registration_json(id).await.unwrap();
        h.metrics.flush().await;

        assert_eq!(body.as_deref(), Some("ok"));
        assert_eq!(h.jembi.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.sender.names(), vec!["qa.personal.sum.json_to_jembi_success"]);

        let posted: serde_json::Value =
            serde_json::from_str(&h.jembi.bodies.lock().unwrap()[0]).unwrap();
        assert_eq!(posted["id"], "5551111^^^ZW^PPN");
        assert_eq!(posted["encdate"], "20130819144811");
    }

    #[tokio::test]
    async fn test_server_error_retries_then_fires_one_failure() {
        let h = harness(531);
        let id = store_personal(&h.store).await;

        let err = h.dispatcher.post_registration_json(id).await.unwrap_err();
        h.metrics.flush().await;

        assert!(matches!(err, JobError::RetriesExhausted { attempts: 4, .. }));
        assert_eq!(h.jembi.calls.load(Ordering::SeqCst), 4);
        assert_eq!(h.sender.names(), vec!["qa.personal.sum.json_to_jembi_fail"]);
    }

    #[tokio::test]
    async fn test_client_error_fails_immediately() {
        let h = harness(404);
        let id = store_personal(&h.store).await;

        let err = h.dispatcher.post_registration_json(id).await.unwrap_err();
        h.metrics.flush().await;

        assert!(matches!(err, JobError::Failed { .. }));
        assert_eq!(h.jembi.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.sender.names(), vec!["qa.personal.sum.json_to_jembi_fail"]);
    }

    #[tokio::test]
    async fn test_missing_registration_ends_quietly() {
        let h = harness(201);
        let result = h
            .dispatcher
            .post_registration_json(RegistrationId(404))
            .await
            .unwrap();
        h.metrics.flush().await;

        assert!(result.is_none());
        assert_eq!(h.jembi.calls.load(Ordering::SeqCst), 0);
        assert!(h.sender.names().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_with_dossier() {
        let h = harness(200);
        let id = store_personal(&h.store).await;

        let (json, xml) = h.dispatcher.dispatch_registration(id).await;
        h.metrics.flush().await;

        assert!(json.unwrap().is_some());
        assert!(xml.unwrap().unwrap().is_some());
        let mut names = h.sender.names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "qa.personal.sum.doc_to_jembi_success",
                "qa.personal.sum.json_to_jembi_success",
            ]
        );
        assert!(h
            .jembi
            .bodies
            .lock()
            .unwrap()
            .iter()
            .any(|b| b.contains("<DocumentDossier>")));
    }
}
