//! Contact and subscription reconciliation
//!
//! For each registration:
//!
//! 1. Look the contact up by the primary number; create it on the not-found
//!    sentinel, otherwise merge the registration extras into it.
//! 2. If the primary number already has an active subscription in the
//!    programme, keep it.
//! 3. If the secondary number has one, transfer it: same message set,
//!    schedule and position on the primary number, old one deactivated.
//! 4. Otherwise create a subscription from the resolved plan.
//! 5. Write the subscription position back into the contact's extras.
//!
//! The whole sequence runs as one job, so a retry starts again from step 1.
//! Step 5 runs for a kept subscription too, so a retry after a failed
//! write-back still lands the extras.

use crate::adapters::store::Store;
use crate::adapters::vumi::ContactsApi;
use crate::config::SubscriptionConfig;
use crate::core::clock::Clock;
use crate::core::extras::{
    group_names, nurse_registration_extras, registration_extras, subscription_extras,
};
use crate::core::jobs::{JobResult, JobRunner};
use crate::core::metrics::{MetricEmitter, MetricEvent};
use crate::core::plan::{nurse_plan, resolve_plan, SubscriptionPlan};
use crate::core::pregnancy::weeks_pregnant_on;
use crate::domain::contact::merge_groups;
use crate::domain::{
    Authority, Contact, ContactUpdate, ExtrasPatch, GroupKey, JobError, MomConnectError, Msisdn,
    NewContact, NewSubscription, NurseRegistration, NurseRegistrationId, PlanError, Programme,
    Registration, RegistrationId, Result, Subscription, SubscriptionId, VumiError,
};
use crate::log_error_with_context;
use serde::Serialize;
use std::sync::Arc;

pub const UPDATE_CREATE_VUMI_CONTACT: &str = "update_create_vumi_contact";
pub const NURSE_UPDATE_CREATE_VUMI_CONTACT: &str = "nursereg_update_create_vumi_contact";

/// What happened to the primary number's subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubscriptionAction {
    /// Already subscribed; the existing subscription is kept
    AlreadyActive { subscription: SubscriptionId },
    Transferred {
        from: SubscriptionId,
        to: SubscriptionId,
    },
    Created { subscription: SubscriptionId },
}

/// Result of one successful synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub contact: Contact,
    pub action: SubscriptionAction,
}

/// Programme-independent view of a registration
struct SyncRequest {
    programme: Programme,
    primary: Msisdn,
    secondary: Option<Msisdn>,
    extras: ExtrasPatch,
    groups: Vec<String>,
    plan: SubscriptionPlan,
    lang: String,
}

/// Keeps contacts and subscriptions in step with registrations
pub struct ContactSynchronizer {
    store: Arc<dyn Store>,
    contacts: Arc<dyn ContactsApi>,
    metrics: Arc<MetricEmitter>,
    runner: JobRunner,
    clock: Arc<dyn Clock>,
    config: SubscriptionConfig,
}

impl ContactSynchronizer {
    pub fn new(
        store: Arc<dyn Store>,
        contacts: Arc<dyn ContactsApi>,
        metrics: Arc<MetricEmitter>,
        runner: JobRunner,
        clock: Arc<dyn Clock>,
        config: SubscriptionConfig,
    ) -> Self {
        Self {
            store,
            contacts,
            metrics,
            runner,
            clock,
            config,
        }
    }

    /// Plan for a mother registration, banded by weeks pregnant at registration
    pub fn plan_for(registration: &Registration) -> std::result::Result<SubscriptionPlan, PlanError> {
        let weeks = match registration.authority {
            Authority::Clinic => registration
                .mom_edd
                .map(|edd| weeks_pregnant_on(registration.created_at.date_naive(), edd)),
            Authority::Personal | Authority::Chw => None,
        };
        resolve_plan(registration.authority, weeks)
    }

    /// Synchronizes a mother registration
    ///
    /// Returns `None` when the registration does not exist.
    pub async fn sync_registration(&self, id: RegistrationId) -> JobResult<SyncOutcome> {
        let job = UPDATE_CREATE_VUMI_CONTACT;
        let registration = match self.store.get_registration(id).await {
            Ok(Some(registration)) => registration,
            Ok(None) => {
                let error = MomConnectError::NotFound(format!("registration {id}"));
                log_error_with_context!(error, "Missing Registration object");
                return Ok(None);
            }
            Err(source) => return Err(self.failed(job, Programme::MomConnect, source)),
        };

        let plan = match Self::plan_for(&registration) {
            Ok(plan) => plan,
            Err(e) => return Err(self.failed(job, Programme::MomConnect, e.into())),
        };
        tracing::info!(registration_id = %id, plan = %plan, "Resolved subscription plan");

        let request = SyncRequest {
            programme: Programme::MomConnect,
            primary: registration.mom_msisdn.clone(),
            secondary: registration.hcw_msisdn.clone(),
            extras: registration_extras(&registration),
            groups: group_names(&registration, &plan),
            plan,
            lang: registration.mom_lang.clone(),
        };
        self.run(job, id, &request).await
    }

    /// Synchronizes a nurse registration; the replaced number is the transfer source
    pub async fn sync_nurse_registration(&self, id: NurseRegistrationId) -> JobResult<SyncOutcome> {
        let job = NURSE_UPDATE_CREATE_VUMI_CONTACT;
        let registration: NurseRegistration = match self.store.get_nurse_registration(id).await {
            Ok(Some(registration)) => registration,
            Ok(None) => {
                let error = MomConnectError::NotFound(format!("nurse registration {id}"));
                log_error_with_context!(error, "Missing NurseReg object");
                return Ok(None);
            }
            Err(source) => return Err(self.failed(job, Programme::NurseConnect, source)),
        };

        let request = SyncRequest {
            programme: Programme::NurseConnect,
            primary: registration.cmsisdn.clone(),
            secondary: registration.rmsisdn.clone(),
            extras: nurse_registration_extras(&registration),
            groups: Vec::new(),
            plan: nurse_plan(),
            lang: self.config.default_language.clone(),
        };
        self.run(job, id, &request).await
    }

    fn failed(&self, job: &str, programme: Programme, source: MomConnectError) -> JobError {
        self.metrics.record(MetricEvent::ContactSyncFail { programme });
        JobError::Failed {
            job: job.to_string(),
            source,
        }
    }

    async fn run(
        &self,
        job: &str,
        record_id: impl std::fmt::Display,
        request: &SyncRequest,
    ) -> JobResult<SyncOutcome> {
        let this = self;
        let result = self
            .runner
            .run(job, record_id, move || this.reconcile(request))
            .await;

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                if !matches!(e, JobError::TimedOut { .. }) {
                    self.metrics.record(MetricEvent::ContactSyncFail {
                        programme: request.programme,
                    });
                }
                Err(e)
            }
        }
    }

    async fn reconcile(&self, request: &SyncRequest) -> Result<SyncOutcome> {
        let groups = self.resolve_groups(&request.groups).await?;
        let contact = self.upsert_contact(request, groups).await?;

        let (subscription, action) = match self
            .store
            .active_subscription(&request.primary, request.programme)
            .await?
        {
            Some(existing) => {
                tracing::info!(
                    msisdn = %request.primary,
                    subscription_id = %existing.id,
                    "Number already has an active subscription"
                );
                let action = SubscriptionAction::AlreadyActive {
                    subscription: existing.id,
                };
                (existing, action)
            }
            None => self.subscribe(request, &contact).await?,
        };

        let extras = subscription_extras(request.programme, &subscription).merge_into(&contact.extra);
        let contact = self
            .contacts
            .update_contact(
                &contact.key,
                &ContactUpdate {
                    extra: Some(extras),
                    groups: None,
                },
            )
            .await?;

        Ok(SyncOutcome { contact, action })
    }

    /// Transfers the secondary number's subscription, or creates one from the plan
    async fn subscribe(
        &self,
        request: &SyncRequest,
        contact: &Contact,
    ) -> Result<(Subscription, SubscriptionAction)> {
        let now = self.clock.now();
        let previous = match request.secondary {
            Some(ref secondary) if *secondary != request.primary => {
                self.store
                    .active_subscription(secondary, request.programme)
                    .await?
            }
            _ => None,
        };

        let subscribed = match previous {
            Some(previous) => {
                let transferred = NewSubscription::transferred_from(
                    &previous,
                    contact.key.clone(),
                    contact.msisdn.clone(),
                    contact.user_account.clone(),
                );
                let created = self.store.create_subscription(transferred, now).await?;
                self.store.deactivate_subscription(previous.id, now).await?;
                tracing::info!(
                    from = %previous.to_addr,
                    to = %created.to_addr,
                    "Transferred subscription"
                );
                let action = SubscriptionAction::Transferred {
                    from: previous.id,
                    to: created.id,
                };
                (created, action)
            }
            None => {
                let created = self.create_subscription(request, contact).await?;
                let action = SubscriptionAction::Created {
                    subscription: created.id,
                };
                (created, action)
            }
        };
        Ok(subscribed)
    }

    async fn resolve_groups(&self, names: &[String]) -> Result<Vec<GroupKey>> {
        let mut keys = Vec::with_capacity(names.len());
        for name in names {
            let group = match self.contacts.find_group_by_name(name).await? {
                Some(group) => group,
                None => {
                    tracing::debug!(group = %name, "Creating contact group");
                    self.contacts.create_group(name).await?
                }
            };
            keys.push(group.key);
        }
        Ok(keys)
    }

    async fn upsert_contact(&self, request: &SyncRequest, groups: Vec<GroupKey>) -> Result<Contact> {
        match self.contacts.get_contact_by_msisdn(&request.primary).await {
            Ok(existing) => {
                tracing::info!(msisdn = %request.primary, "Contact exists - updating contact");
                let update = ContactUpdate {
                    extra: Some(request.extras.merge_into(&existing.extra)),
                    groups: (!groups.is_empty()).then(|| merge_groups(&existing.groups, &groups)),
                };
                self.contacts.update_contact(&existing.key, &update).await
            }
            Err(MomConnectError::Vumi(VumiError::ContactNotFound(_))) => {
                tracing::info!(
                    msisdn = %request.primary,
                    "Contact doesn't exist - creating new contact"
                );
                let contact = NewContact {
                    msisdn: request.primary.clone(),
                    extra: request.extras.merge_into(&Default::default()),
                    groups,
                };
                self.contacts.create_contact(&contact).await
            }
            Err(e) => Err(e),
        }
    }

    async fn create_subscription(
        &self,
        request: &SyncRequest,
        contact: &Contact,
    ) -> Result<Subscription> {
        let result = self.new_subscription(request, contact).await;
        let success = result.is_ok();

        match request.programme {
            Programme::MomConnect => {
                if success {
                    self.metrics.record(MetricEvent::Subscriptions);
                }
                self.metrics.record(MetricEvent::SubscriptionToProtocol {
                    message_set: request.plan.message_set,
                    success,
                });
            }
            Programme::NurseConnect => {
                if success {
                    self.metrics.record(MetricEvent::NurseSubscriptions);
                }
                self.metrics
                    .record(MetricEvent::NurseSubscriptionToProtocol { success });
            }
        }

        if let Err(ref e) = result {
            log_error_with_context!(e, "Error creating Subscription instance");
        }
        result
    }

    async fn new_subscription(
        &self,
        request: &SyncRequest,
        contact: &Contact,
    ) -> Result<Subscription> {
        let plan = &request.plan;
        let message_set = self
            .store
            .message_set_by_name(plan.message_set)
            .await?
            .ok_or_else(|| PlanError::UnknownMessageSet(plan.message_set.to_string()))?;
        let schedule = plan.schedule(&self.config)?;

        let subscription = NewSubscription {
            contact_key: contact.key.clone(),
            to_addr: contact.msisdn.clone(),
            user_account: contact.user_account.clone(),
            lang: request.lang.clone(),
            message_set: message_set.id,
            schedule,
            next_sequence_number: plan.seq_start,
        };
        let created = self
            .store
            .create_subscription(subscription, self.clock.now())
            .await?;
        tracing::info!(to_addr = %created.to_addr, "Created subscription");
        Ok(created)
    }
}
