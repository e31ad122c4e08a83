//! In-memory store with an optional JSON snapshot on disk

use super::{RegistrationStore, SubscriptionStore};
use crate::domain::context::ResultExt;
use crate::domain::subscription::DEFAULT_MESSAGE_SETS;
use crate::domain::{
    MessageSet, MessageSetId, MomConnectError, Msisdn, NewNurseRegistration, NewRegistration,
    NewSubscription, NurseRegistration, NurseRegistrationId, Programme, Registration,
    RegistrationId, Result, Subscription, SubscriptionId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Serialized form of the whole store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub message_sets: Vec<MessageSet>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub nurse_registrations: Vec<NurseRegistration>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Default)]
struct Tables {
    message_sets: BTreeMap<MessageSetId, MessageSet>,
    registrations: BTreeMap<RegistrationId, Registration>,
    nurse_registrations: BTreeMap<NurseRegistrationId, NurseRegistration>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl Tables {
    fn next_key<K: Ord + Copy, V>(map: &BTreeMap<K, V>, raw: impl Fn(K) -> u64) -> u64 {
        map.keys().next_back().map(|k| raw(*k) + 1).unwrap_or(1)
    }
}

/// Thread-safe store guarded by a single `RwLock`
///
/// Ids are assigned sequentially per table, continuing after the highest id
/// of a loaded snapshot.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store seeded with the default message sets
    pub fn new() -> Self {
        let message_sets = DEFAULT_MESSAGE_SETS
            .iter()
            .map(|(id, name)| (MessageSetId(*id), MessageSet::new(*id, *name)))
            .collect();
        Self {
            tables: Arc::new(RwLock::new(Tables {
                message_sets,
                ..Tables::default()
            })),
        }
    }

    /// Store rebuilt from a snapshot
    ///
    /// A snapshot without message sets gets the defaults.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = if snapshot.message_sets.is_empty() {
            Self::new()
        } else {
            Self {
                tables: Arc::new(RwLock::new(Tables::default())),
            }
        };

        // Nobody else holds the lock yet
        if let Ok(mut tables) = store.tables.try_write() {
            for set in snapshot.message_sets {
                tables.message_sets.insert(set.id, set);
            }
            for reg in snapshot.registrations {
                tables.registrations.insert(reg.id, reg);
            }
            for reg in snapshot.nurse_registrations {
                tables.nurse_registrations.insert(reg.id, reg);
            }
            for sub in snapshot.subscriptions {
                tables.subscriptions.insert(sub.id, sub);
            }
        }
        store
    }

    /// Loads a JSON snapshot, or starts empty if the file does not exist
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No state file yet, starting empty");
            return Ok(Self::new());
        }

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            MomConnectError::Store(format!("Failed to read {}: {e}", path.display()))
        })?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid state file {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            registrations = snapshot.registrations.len(),
            subscriptions = snapshot.subscriptions.len(),
            "Loaded state file"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Writes the current contents as pretty JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot().await)?;
        tokio::fs::write(path, json).await.map_err(|e| {
            MomConnectError::Store(format!("Failed to write {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Saved state file");
        Ok(())
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.read().await;
        StoreSnapshot {
            message_sets: tables.message_sets.values().cloned().collect(),
            registrations: tables.registrations.values().cloned().collect(),
            nurse_registrations: tables.nurse_registrations.values().cloned().collect(),
            subscriptions: tables.subscriptions.values().cloned().collect(),
        }
    }

    /// Every subscription, active or not
    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.tables
            .read()
            .await
            .subscriptions
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn insert_registration(
        &self,
        registration: NewRegistration,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut tables = self.tables.write().await;
        let id = RegistrationId(Tables::next_key(&tables.registrations, RegistrationId::get));
        let stored = registration.into_registration(id, now);
        tables.registrations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_registration(&self, id: RegistrationId) -> Result<Option<Registration>> {
        Ok(self.tables.read().await.registrations.get(&id).cloned())
    }

    async fn insert_nurse_registration(
        &self,
        registration: NewNurseRegistration,
        now: DateTime<Utc>,
    ) -> Result<NurseRegistration> {
        let mut tables = self.tables.write().await;
        let id = NurseRegistrationId(Tables::next_key(
            &tables.nurse_registrations,
            NurseRegistrationId::get,
        ));
        let stored = registration.into_registration(id, now);
        tables.nurse_registrations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_nurse_registration(
        &self,
        id: NurseRegistrationId,
    ) -> Result<Option<NurseRegistration>> {
        Ok(self.tables.read().await.nurse_registrations.get(&id).cloned())
    }

    async fn count_nurse_registrations_for(&self, faccode: &str) -> Result<usize> {
        Ok(self
            .tables
            .read()
            .await
            .nurse_registrations
            .values()
            .filter(|r| r.faccode == faccode)
            .count())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn message_set_by_name(&self, short_name: &str) -> Result<Option<MessageSet>> {
        Ok(self
            .tables
            .read()
            .await
            .message_sets
            .values()
            .find(|s| s.short_name == short_name)
            .cloned())
    }

    async fn active_subscription(
        &self,
        to_addr: &Msisdn,
        programme: Programme,
    ) -> Result<Option<Subscription>> {
        let tables = self.tables.read().await;
        let in_programme = |id: &MessageSetId| {
            tables
                .message_sets
                .get(id)
                .is_some_and(|set| programme.includes(&set.short_name))
        };
        Ok(tables
            .subscriptions
            .values()
            .find(|s| s.active && s.to_addr == *to_addr && in_programme(&s.message_set))
            .cloned())
    }

    async fn create_subscription(
        &self,
        subscription: NewSubscription,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        let mut tables = self.tables.write().await;
        if !tables.message_sets.contains_key(&subscription.message_set) {
            return Err(MomConnectError::Store(format!(
                "Message set {} does not exist",
                subscription.message_set
            )));
        }
        let id = SubscriptionId(Tables::next_key(&tables.subscriptions, SubscriptionId::get));
        let stored = subscription.into_subscription(id, now);
        tables.subscriptions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn deactivate_subscription(&self, id: SubscriptionId, now: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .get_mut(&id)
            .ok_or_else(|| MomConnectError::NotFound(format!("Subscription {id}")))?;
        subscription.active = false;
        subscription.updated_at = now;
        Ok(())
    }

    async fn subscriptions_for(&self, to_addr: &Msisdn) -> Result<Vec<Subscription>> {
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| s.to_addr == *to_addr)
            .cloned()
            .collect())
    }
}
