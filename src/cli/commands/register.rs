//! `register` and `register-nurse` commands
//!
//! Reads one draft (or a JSON array of drafts), runs each through the intake
//! and prints the reports as JSON. With `--state` the store is loaded from and
//! saved back to a snapshot file, so ids and subscriptions carry over between
//! runs.

use crate::adapters::jembi::{JembiApi, JembiClient, LoggingJembi};
use crate::adapters::store::{MemoryStore, Store};
use crate::adapters::vumi::{
    ContactsApi, HttpContactsClient, HttpMetricSender, InMemoryContacts, LoggingMetricSender,
    MetricSender,
};
use crate::config::{load_config, MomConnectConfig};
use crate::core::clock::{Clock, SystemClock};
use crate::core::dispatch::NotificationDispatcher;
use crate::core::intake::RegistrationIntake;
use crate::core::jobs::JobRunner;
use crate::core::metrics::MetricEmitter;
use crate::core::sync::ContactSynchronizer;
use crate::domain::{NurseRegistrationDraft, RegistrationDraft};
use anyhow::Context;
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments shared by the registration commands
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// JSON file holding a draft or an array of drafts
    #[arg(short, long)]
    pub input: PathBuf,

    /// Store snapshot to load before and save after processing
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Keep everything in process: no contacts, Jembi or metric calls
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl RegisterArgs {
    /// Processes mother registrations
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let drafts: Vec<RegistrationDraft> = read_drafts(&self.input)?;
        let Some((config, store)) = self.prepare(config_path).await? else {
            return Ok(2);
        };
        let intake = assemble(&config, store.clone(), self.dry_run(&config))?;

        let mut failures = 0;
        for draft in drafts {
            match intake.submit(draft).await {
                Ok(report) => {
                    if !report.jembi.is_completed() || !report.contact_sync.is_completed() {
                        failures += 1;
                    }
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(error = %e, "Registration rejected");
                    println!("❌ Registration rejected: {e}");
                }
            }
        }

        intake.flush_metrics().await;
        self.finish(&store, failures).await
    }

    /// Processes nurse registrations
    pub async fn execute_nurse(&self, config_path: &str) -> anyhow::Result<i32> {
        let drafts: Vec<NurseRegistrationDraft> = read_drafts(&self.input)?;
        let Some((config, store)) = self.prepare(config_path).await? else {
            return Ok(2);
        };
        let intake = assemble(&config, store.clone(), self.dry_run(&config))?;

        let mut failures = 0;
        for draft in drafts {
            match intake.submit_nurse(draft).await {
                Ok(report) => {
                    if !report.jembi.is_completed() || !report.contact_sync.is_completed() {
                        failures += 1;
                    }
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(error = %e, "Nurse registration rejected");
                    println!("❌ Nurse registration rejected: {e}");
                }
            }
        }

        intake.flush_metrics().await;
        self.finish(&store, failures).await
    }

    fn dry_run(&self, config: &MomConnectConfig) -> bool {
        self.dry_run || config.application.dry_run
    }

    async fn prepare(&self, config_path: &str) -> anyhow::Result<Option<(MomConnectConfig, MemoryStore)>> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(None);
            }
        };

        let store = match &self.state {
            Some(path) => MemoryStore::load(path)
                .await
                .with_context(|| format!("Failed to load state from {}", path.display()))?,
            None => MemoryStore::new(),
        };
        Ok(Some((config, store)))
    }

    async fn finish(&self, store: &MemoryStore, failures: usize) -> anyhow::Result<i32> {
        if let Some(path) = &self.state {
            store
                .save(path)
                .await
                .with_context(|| format!("Failed to save state to {}", path.display()))?;
            tracing::info!(path = %path.display(), "State saved");
        }
        Ok(if failures == 0 { 0 } else { 1 })
    }
}

fn read_drafts<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let drafts: OneOrMany<T> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a registration or a list of them", path.display()))?;
    Ok(drafts.into_vec())
}

/// Wires the intake from configuration
///
/// A dry run swaps the contacts API, Jembi and the metric sender for
/// in-process stand-ins.
pub(crate) fn assemble(
    config: &MomConnectConfig,
    store: MemoryStore,
    dry_run: bool,
) -> anyhow::Result<RegistrationIntake> {
    let (contacts, jembi, sender): (Arc<dyn ContactsApi>, Arc<dyn JembiApi>, Arc<dyn MetricSender>) =
        if dry_run {
            tracing::info!("Dry run: contacts, Jembi and metrics stay in process");
            (
                Arc::new(InMemoryContacts::with_user_account(
                    config.vumi.account_key.clone(),
                )),
                Arc::new(LoggingJembi::new()),
                Arc::new(LoggingMetricSender::new()),
            )
        } else {
            (
                Arc::new(HttpContactsClient::new(&config.vumi)?),
                Arc::new(JembiClient::new(&config.jembi)?),
                Arc::new(HttpMetricSender::new(&config.vumi)?),
            )
        };

    let store: Arc<dyn Store> = Arc::new(store);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Arc::new(MetricEmitter::new(sender, &config.metrics));
    let runner = JobRunner::from_config(&config.jobs);

    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        jembi,
        metrics.clone(),
        runner.clone(),
        clock.clone(),
    )
    .with_xml(config.jembi.send_xml);
    let synchronizer = ContactSynchronizer::new(
        store.clone(),
        contacts,
        metrics.clone(),
        runner,
        clock.clone(),
        config.subscription.clone(),
    );

    Ok(RegistrationIntake::new(
        store,
        clock,
        metrics,
        dispatcher,
        synchronizer,
    ))
}
