//! In-process contacts API
//!
//! Behaves like the hosted API, including the 400 not-found sentinel, so the
//! synchronizers can run in dry-run mode and in tests without a server.

use super::contacts::ContactsApi;
use crate::domain::{
    Contact, ContactKey, ContactUpdate, Group, GroupKey, Msisdn, NewContact, Result, VumiError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe contacts store keyed by contact key
#[derive(Debug, Default)]
pub struct InMemoryContacts {
    contacts: Arc<RwLock<HashMap<ContactKey, Contact>>>,
    groups: Arc<RwLock<Vec<Group>>>,
    user_account: Option<String>,
    next_id: AtomicU64,
}

impl InMemoryContacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts created here are owned by `account`
    pub fn with_user_account(account: impl Into<String>) -> Self {
        Self {
            user_account: Some(account.into()),
            ..Self::default()
        }
    }

    /// Seeds an existing contact
    pub async fn insert(&self, contact: Contact) {
        self.contacts
            .write()
            .await
            .insert(contact.key.clone(), contact);
    }

    /// Seeds an existing group
    pub async fn insert_group(&self, group: Group) {
        self.groups.write().await.push(group);
    }

    pub async fn contacts(&self) -> Vec<Contact> {
        self.contacts.read().await.values().cloned().collect()
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.groups.read().await.clone()
    }

    fn next_key(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }
}

#[async_trait]
impl ContactsApi for InMemoryContacts {
    async fn get_contact_by_msisdn(&self, msisdn: &Msisdn) -> Result<Contact> {
        self.contacts
            .read()
            .await
            .values()
            .find(|c| c.msisdn == *msisdn)
            .cloned()
            .ok_or_else(|| VumiError::ContactNotFound(msisdn.to_string()).into())
    }

    async fn get_contact(&self, key: &ContactKey) -> Result<Contact> {
        self.contacts
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| VumiError::ContactNotFound(key.to_string()).into())
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        let key = ContactKey::new(self.next_key("contact"))
            .map_err(VumiError::InvalidResponse)?;
        let created = Contact {
            key: key.clone(),
            msisdn: contact.msisdn.clone(),
            user_account: self.user_account.clone(),
            groups: contact.groups.clone(),
            extra: contact.extra.clone(),
        };
        self.contacts.write().await.insert(key, created.clone());
        Ok(created)
    }

    async fn update_contact(&self, key: &ContactKey, update: &ContactUpdate) -> Result<Contact> {
        let mut contacts = self.contacts.write().await;
        let contact = contacts
            .get_mut(key)
            .ok_or_else(|| VumiError::ContactNotFound(key.to_string()))?;
        if let Some(ref extra) = update.extra {
            contact.extra = extra.clone();
        }
        if let Some(ref groups) = update.groups {
            contact.groups = groups.clone();
        }
        Ok(contact.clone())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self
            .groups
            .read()
            .await
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create_group(&self, name: &str) -> Result<Group> {
        let group = Group {
            key: GroupKey::new(self.next_key("group")),
            name: name.to_string(),
        };
        self.groups.write().await.push(group.clone());
        Ok(group)
    }
}
