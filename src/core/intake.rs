//! Registration intake
//!
//! Validates and stores a registration, then runs the Jembi notification and
//! the contact synchronization side by side. Only validation and storage
//! failures reach the caller as errors; job failures end up in the report.
//! Metrics are sent in the background; call
//! [`RegistrationIntake::flush_metrics`] before shutting down.

use crate::adapters::store::Store;
use crate::core::clock::Clock;
use crate::core::dispatch::NotificationDispatcher;
use crate::core::jobs::JobStatus;
use crate::core::metrics::{MetricEmitter, MetricEvent};
use crate::core::sync::{ContactSynchronizer, SubscriptionAction};
use crate::domain::{NurseRegistration, NurseRegistrationDraft, Registration, RegistrationDraft, Result};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one mother registration
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub registration: Registration,
    pub jembi: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dossier: Option<JobStatus>,
    pub contact_sync: JobStatus,
    pub subscription: Option<SubscriptionAction>,
}

/// Outcome of one nurse registration
#[derive(Debug, Clone, Serialize)]
pub struct NurseRegistrationReport {
    pub registration: NurseRegistration,
    pub jembi: JobStatus,
    pub contact_sync: JobStatus,
    pub subscription: Option<SubscriptionAction>,
    /// First registration seen from this facility
    pub new_clinic: bool,
}

pub struct RegistrationIntake {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricEmitter>,
    dispatcher: NotificationDispatcher,
    synchronizer: ContactSynchronizer,
}

impl RegistrationIntake {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricEmitter>,
        dispatcher: NotificationDispatcher,
        synchronizer: ContactSynchronizer,
    ) -> Self {
        Self {
            store,
            clock,
            metrics,
            dispatcher,
            synchronizer,
        }
    }

    /// Validates, stores and processes a mother registration
    ///
    /// # Errors
    ///
    /// `MomConnectError::Validation` for a draft that breaks a field rule, or a
    /// store error. Background job failures are reported, not returned.
    pub async fn submit(&self, draft: RegistrationDraft) -> Result<RegistrationReport> {
        let registration = self
            .store
            .insert_registration(draft.validate()?, self.clock.now())
            .await?;
        let id = registration.id;
        tracing::info!(
            registration_id = %id,
            authority = %registration.authority.as_str(),
            "Registration stored"
        );

        let ((jembi, dossier), sync) = tokio::join!(
            self.dispatcher.dispatch_registration(id),
            self.synchronizer.sync_registration(id)
        );

        Ok(RegistrationReport {
            registration,
            jembi: JobStatus::of(&jembi),
            dossier: dossier.as_ref().map(JobStatus::of),
            contact_sync: JobStatus::of(&sync),
            subscription: sync.ok().flatten().map(|outcome| outcome.action),
        })
    }

    /// Validates, stores and processes a nurse registration
    ///
    /// The first registration from a facility code also counts a new clinic.
    pub async fn submit_nurse(&self, draft: NurseRegistrationDraft) -> Result<NurseRegistrationReport> {
        let new_registration = draft.validate()?;
        let new_clinic = self
            .store
            .count_nurse_registrations_for(&new_registration.faccode)
            .await?
            == 0;

        let registration = self
            .store
            .insert_nurse_registration(new_registration, self.clock.now())
            .await?;
        let id = registration.id;
        tracing::info!(nurse_registration_id = %id, faccode = %registration.faccode, "Nurse registration stored");

        if new_clinic {
            self.metrics.record(MetricEvent::UniqueClinic);
        }

        let (jembi, sync) = tokio::join!(
            self.dispatcher.post_nurse_registration_json(id),
            self.synchronizer.sync_nurse_registration(id)
        );

        Ok(NurseRegistrationReport {
            registration,
            jembi: JobStatus::of(&jembi),
            contact_sync: JobStatus::of(&sync),
            subscription: sync.ok().flatten().map(|outcome| outcome.action),
            new_clinic,
        })
    }

    /// Waits for metric sends still in flight
    pub async fn flush_metrics(&self) {
        self.metrics.flush().await;
    }
}
