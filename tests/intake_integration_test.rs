//! Registration intake end to end, with in-process contacts, Jembi and metrics

use chrono::{TimeZone, Utc};
use momconnect::adapters::jembi::LoggingJembi;
use momconnect::adapters::store::{MemoryStore, Store};
use async_trait::async_trait;
use momconnect::adapters::vumi::{InMemoryContacts, LoggingMetricSender, Metric, MetricSender};
use momconnect::config::{MetricsConfig, SubscriptionConfig};
use momconnect::core::clock::FixedClock;
use momconnect::core::dispatch::NotificationDispatcher;
use momconnect::core::intake::RegistrationIntake;
use momconnect::core::jobs::{JobRunner, JobStatus, RetryPolicy};
use momconnect::core::metrics::MetricEmitter;
use momconnect::core::sync::SubscriptionAction;
use momconnect::domain::{
    Authority, IdType, MomConnectError, Msisdn, NurseRegistrationDraft, RegistrationDraft,
};
use std::sync::Arc;
use std::time::Duration;

/// Metric sender whose requests never complete
struct StalledSender;

#[async_trait]
impl MetricSender for StalledSender {
    async fn fire_metric(&self, _metric: &Metric) -> momconnect::domain::Result<()> {
        futures::future::pending().await
    }
}

struct World {
    intake: RegistrationIntake,
    store: MemoryStore,
    contacts: Arc<InMemoryContacts>,
    jembi: Arc<LoggingJembi>,
    sender: Arc<LoggingMetricSender>,
}

fn world() -> World {
    let sender = Arc::new(LoggingMetricSender::new());
    world_with(sender.clone(), sender)
}

fn world_with(sender: Arc<LoggingMetricSender>, metric_sender: Arc<dyn MetricSender>) -> World {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2013, 8, 19, 9, 30, 0).unwrap(),
    ));
    let store = MemoryStore::new();
    let contacts = Arc::new(InMemoryContacts::with_user_account("knownaccount"));
    let jembi = Arc::new(LoggingJembi::new());
    let metrics = Arc::new(MetricEmitter::new(metric_sender, &MetricsConfig::default()));
    let runner = JobRunner::new(RetryPolicy::default().without_delay(), Duration::from_secs(5));

    let shared: Arc<dyn Store> = Arc::new(store.clone());
    let dispatcher = NotificationDispatcher::new(
        shared.clone(),
        jembi.clone(),
        metrics.clone(),
        runner.clone(),
        clock.clone(),
    );
    let synchronizer = momconnect::core::sync::ContactSynchronizer::new(
        shared.clone(),
        contacts.clone(),
        metrics.clone(),
        runner,
        clock.clone(),
        SubscriptionConfig::default(),
    );

    World {
        intake: RegistrationIntake::new(shared, clock, metrics, dispatcher, synchronizer),
        store,
        contacts,
        jembi,
        sender,
    }
}

fn clinic_draft(mom_msisdn: &str) -> RegistrationDraft {
    RegistrationDraft {
        hcw_msisdn: Some("+27820001001".to_string()),
        mom_msisdn: Some(mom_msisdn.to_string()),
        mom_id_type: Some(IdType::None),
        mom_lang: Some("en".to_string()),
        mom_edd: Some("2013-09-24".to_string()),
        clinic_code: Some("123456".to_string()),
        authority: Some(Authority::Clinic),
        source: Some("Clinic USSD".to_string()),
        ..Default::default()
    }
}

fn nurse_draft(cmsisdn: &str, faccode: &str) -> NurseRegistrationDraft {
    NurseRegistrationDraft {
        cmsisdn: Some(cmsisdn.to_string()),
        faccode: Some(faccode.to_string()),
        nurse_source: Some("Nurse USSD".to_string()),
        ..Default::default()
    }
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[tokio::test]
async fn test_clinic_registration_flow() {
    let w = world();
    let report = w.intake.submit(clinic_draft("+27820001002")).await.unwrap();
    w.intake.flush_metrics().await;

    assert_eq!(report.jembi, JobStatus::Completed);
    assert_eq!(report.contact_sync, JobStatus::Completed);
    assert!(report.dossier.is_none());
    assert!(matches!(
        report.subscription,
        Some(SubscriptionAction::Created { .. })
    ));

    let subscriptions = w.store.subscriptions().await;
    assert_eq!(subscriptions.len(), 1);
    // week 35 lands in the "later" set at message 13
    assert_eq!(subscriptions[0].next_sequence_number, 13);

    let contacts = w.contacts.contacts().await;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].extra["is_registered"], "true");
    assert_eq!(contacts[0].extra["edd"], "2013-09-24");

    let mut groups: Vec<String> = w.contacts.groups().await.into_iter().map(|g| g.name).collect();
    groups.sort();
    assert_eq!(groups, vec!["en".to_string(), "later".to_string()]);

    assert_eq!(w.jembi.posted().len(), 1);
    assert_eq!(
        sorted(w.sender.names()),
        vec![
            "qa.clinic.sum.json_to_jembi_success".to_string(),
            "qa.later.sum.subscription_to_protocol_success".to_string(),
            "qa.sum.subscriptions".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_second_registration_keeps_subscription() {
    let w = world();
    w.intake.submit(clinic_draft("+27820001002")).await.unwrap();
    let report = w.intake.submit(clinic_draft("+27820001002")).await.unwrap();

    assert!(matches!(
        report.subscription,
        Some(SubscriptionAction::AlreadyActive { .. })
    ));
    assert_eq!(w.store.subscriptions().await.len(), 1);
    assert_eq!(w.contacts.contacts().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_before_storage() {
    let w = world();
    let mut draft = clinic_draft("+27820001002");
    draft.mom_edd = None;

    let err = w.intake.submit(draft).await.unwrap_err();
    assert!(matches!(err, MomConnectError::Validation(_)));
    assert!(w.store.snapshot().await.registrations.is_empty());
    assert!(w.sender.names().is_empty());
}

#[tokio::test]
async fn test_out_of_band_week_fails_contact_sync() {
    let w = world();
    let mut draft = clinic_draft("+27820001002");
    // due date far in the future puts the registration at the minimum week
    draft.mom_edd = Some("2014-05-01".to_string());

    let report = w.intake.submit(draft).await.unwrap();
    w.intake.flush_metrics().await;
    assert_eq!(report.jembi, JobStatus::Completed);
    assert!(matches!(report.contact_sync, JobStatus::Failed { .. }));
    assert!(report.subscription.is_none());
    assert!(w
        .sender
        .names()
        .contains(&"qa.momconnect.sum.contact_sync_fail".to_string()));
}

#[tokio::test]
async fn test_nurse_registrations_count_unique_clinics() {
    let w = world();
    let first = w
        .intake
        .submit_nurse(nurse_draft("+27821112222", "123456"))
        .await
        .unwrap();
    w.intake.flush_metrics().await;
    assert!(first.new_clinic);
    assert_eq!(first.jembi, JobStatus::Completed);
    assert!(matches!(
        first.subscription,
        Some(SubscriptionAction::Created { .. })
    ));
    assert_eq!(
        sorted(w.sender.names()),
        vec![
            "qa.nurseconnect.sum.nc_subscription_to_protocol_success".to_string(),
            "qa.nurseconnect.unique.clinics".to_string(),
            "qa.nursereg.sum.json_to_jembi_success".to_string(),
            "qa.sum.nc_subscriptions".to_string(),
        ]
    );

    let second = w
        .intake
        .submit_nurse(nurse_draft("+27823334444", "123456"))
        .await
        .unwrap();
    w.intake.flush_metrics().await;
    assert!(!second.new_clinic);
    let unique = w
        .sender
        .names()
        .into_iter()
        .filter(|n| n == "qa.nurseconnect.unique.clinics")
        .count();
    assert_eq!(unique, 1);
}

#[tokio::test]
async fn test_nurse_number_change_transfers_subscription() {
    let w = world();
    w.intake
        .submit_nurse(nurse_draft("+27821112222", "123456"))
        .await
        .unwrap();

    let mut change = nurse_draft("+27825556666", "123456");
    change.rmsisdn = Some("+27821112222".to_string());
    let report = w.intake.submit_nurse(change).await.unwrap();

    assert!(matches!(
        report.subscription,
        Some(SubscriptionAction::Transferred { .. })
    ));
    let subscriptions = w.store.subscriptions().await;
    let active: Vec<_> = subscriptions.iter().filter(|s| s.active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].to_addr, Msisdn::new("+27825556666").unwrap());
}

#[tokio::test]
async fn test_submit_does_not_wait_for_metric_sends() {
    let w = world_with(Arc::new(LoggingMetricSender::new()), Arc::new(StalledSender));

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        w.intake.submit(clinic_draft("+27820001002")),
    )
    .await
    .expect("submit blocked on metric sends")
    .unwrap();

    assert_eq!(report.jembi, JobStatus::Completed);
    assert_eq!(report.contact_sync, JobStatus::Completed);
}
