//! Jembi notification against a mock HTTP server

use chrono::{TimeZone, Utc};
use mockito::Matcher;
use momconnect::adapters::jembi::JembiClient;
use momconnect::adapters::store::{MemoryStore, RegistrationStore, Store};
use momconnect::adapters::vumi::LoggingMetricSender;
use momconnect::config::{JembiConfig, MetricsConfig};
use momconnect::core::clock::FixedClock;
use momconnect::core::dispatch::NotificationDispatcher;
use momconnect::core::jobs::{JobRunner, RetryPolicy};
use momconnect::core::metrics::MetricEmitter;
use momconnect::domain::{Authority, IdType, JobError, RegistrationDraft, RegistrationId};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    dispatcher: NotificationDispatcher,
    sender: Arc<LoggingMetricSender>,
    metrics: Arc<MetricEmitter>,
    id: RegistrationId,
}

fn clinic_draft() -> RegistrationDraft {
    RegistrationDraft {
        hcw_msisdn: Some("+27820001001".to_string()),
        mom_msisdn: Some("+27820001002".to_string()),
        mom_id_type: Some(IdType::SaId),
        mom_id_no: Some("8009151234001".to_string()),
        mom_dob: Some("1980-09-15".to_string()),
        mom_lang: Some("en".to_string()),
        mom_edd: Some("2013-09-24".to_string()),
        clinic_code: Some("123456".to_string()),
        authority: Some(Authority::Clinic),
        source: Some("Clinic USSD".to_string()),
        ..Default::default()
    }
}

async fn harness(server_url: &str, send_xml: bool) -> Harness {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2013, 8, 19, 17, 59, 59).unwrap(),
    ));
    let store = MemoryStore::new();
    let registration = store
        .insert_registration(clinic_draft().validate().unwrap(), clock.0)
        .await
        .unwrap();

    let config = JembiConfig::new(format!("{server_url}/ws/rest/v1"), "user", "pass");
    let jembi = Arc::new(JembiClient::new(&config).unwrap());
    let sender = Arc::new(LoggingMetricSender::new());
    let metrics = Arc::new(MetricEmitter::new(sender.clone(), &MetricsConfig::default()));
    let runner = JobRunner::new(RetryPolicy::default().without_delay(), Duration::from_secs(5));

    let store: Arc<dyn Store> = Arc::new(store);
    let dispatcher = NotificationDispatcher::new(store, jembi, metrics.clone(), runner, clock)
        .with_xml(send_xml);

    Harness {
        dispatcher,
        sender,
        metrics,
        id: registration.id,
    }
}

#[tokio::test]
async fn test_posts_registration_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ws/rest/v1/json/subscription")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "mha": 1,
            "swt": 1,
            "dmsisdn": "+27820001001",
            "cmsisdn": "+27820001002",
            "id": "8009151234001^^^ZAF^NI",
            "type": 3,
            "lang": "en",
            "encdate": "20130819175959",
            "faccode": "123456",
            "dob": "19800915",
            "edd": "20130924"
        })))
        .with_status(201)
        .with_body("Created")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url(), false).await;
    let body = h.dispatcher.post_registration_json(h.id).await.unwrap();
    h.metrics.flush().await;

    assert_eq!(body.as_deref(), Some("Created"));
    mock.assert_async().await;
    assert_eq!(
        h.sender.names(),
        vec!["qa.clinic.sum.json_to_jembi_success".to_string()]
    );
}

#[tokio::test]
async fn test_retryable_status_exhausts_four_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ws/rest/v1/json/subscription")
        .with_status(531)
        .expect(4)
        .create_async()
        .await;

    let h = harness(&server.url(), false).await;
    let result = h.dispatcher.post_registration_json(h.id).await;
    h.metrics.flush().await;

    assert!(matches!(
        result,
        Err(JobError::RetriesExhausted { attempts: 4, .. })
    ));
    mock.assert_async().await;
    assert_eq!(
        h.sender.names(),
        vec!["qa.clinic.sum.json_to_jembi_fail".to_string()]
    );
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ws/rest/v1/json/subscription")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url(), false).await;
    let result = h.dispatcher.post_registration_json(h.id).await;
    h.metrics.flush().await;

    assert!(matches!(result, Err(JobError::Failed { .. })));
    mock.assert_async().await;
    assert_eq!(h.sender.names().len(), 1);
}

#[tokio::test]
async fn test_dossier_posted_as_xml() {
    let mut server = mockito::Server::new_async().await;
    let json = server
        .mock("POST", "/ws/rest/v1/json/subscription")
        .with_status(201)
        .create_async()
        .await;
    let xml = server
        .mock("POST", "/ws/rest/v1/registration/net.ihe/DocumentDossier")
        .match_header("content-type", "application/xml")
        .match_body(Matcher::Regex("<edd>20130924</edd>".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url(), true).await;
    let (json_result, xml_result) = h.dispatcher.dispatch_registration(h.id).await;
    h.metrics.flush().await;

    assert!(json_result.unwrap().is_some());
    assert!(xml_result.unwrap().unwrap().is_some());
    json.assert_async().await;
    xml.assert_async().await;

    let mut names = h.sender.names();
    names.sort();
    assert_eq!(
        names,
        vec![
            "qa.clinic.sum.doc_to_jembi_success".to_string(),
            "qa.clinic.sum.json_to_jembi_success".to_string(),
        ]
    );
}
