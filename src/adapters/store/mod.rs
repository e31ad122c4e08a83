//! Local persistence
//!
//! Registrations are immutable once stored; subscriptions are only ever
//! deactivated, never deleted.

pub mod memory;

pub use memory::{MemoryStore, StoreSnapshot};

use crate::domain::{
    MessageSet, Msisdn, NewNurseRegistration, NewRegistration, NewSubscription,
    NurseRegistration, NurseRegistrationId, Programme, Registration, RegistrationId, Result,
    Subscription, SubscriptionId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage for mother and nurse registrations
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Stores a validated registration and assigns its id
    async fn insert_registration(
        &self,
        registration: NewRegistration,
        now: DateTime<Utc>,
    ) -> Result<Registration>;

    async fn get_registration(&self, id: RegistrationId) -> Result<Option<Registration>>;

    async fn insert_nurse_registration(
        &self,
        registration: NewNurseRegistration,
        now: DateTime<Utc>,
    ) -> Result<NurseRegistration>;

    async fn get_nurse_registration(
        &self,
        id: NurseRegistrationId,
    ) -> Result<Option<NurseRegistration>>;

    /// Number of nurse registrations stored for a facility code
    async fn count_nurse_registrations_for(&self, faccode: &str) -> Result<usize>;
}

/// Storage for message sets and subscriptions
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn message_set_by_name(&self, short_name: &str) -> Result<Option<MessageSet>>;

    /// An active subscription for `to_addr` in any of the programme's message sets
    async fn active_subscription(
        &self,
        to_addr: &Msisdn,
        programme: Programme,
    ) -> Result<Option<Subscription>>;

    async fn create_subscription(
        &self,
        subscription: NewSubscription,
        now: DateTime<Utc>,
    ) -> Result<Subscription>;

    /// Marks a subscription inactive
    ///
    /// # Errors
    ///
    /// `MomConnectError::NotFound` when no subscription has this id.
    async fn deactivate_subscription(&self, id: SubscriptionId, now: DateTime<Utc>) -> Result<()>;

    /// Every subscription targeting `to_addr`, oldest first
    async fn subscriptions_for(&self, to_addr: &Msisdn) -> Result<Vec<Subscription>>;
}

/// Everything the registration jobs read and write locally
pub trait Store: RegistrationStore + SubscriptionStore {}

impl<T: RegistrationStore + SubscriptionStore> Store for T {}
