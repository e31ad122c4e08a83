//! Subscription, message set and message models

use super::ids::{ContactKey, MessageSetId, Msisdn, ScheduleId, SubscriptionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Messaging programme a message set belongs to
///
/// Active-subscription checks are scoped to a programme, so a mother moving
/// from `standard` to `accelerated` still counts as subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Programme {
    MomConnect,
    NurseConnect,
}

impl Programme {
    /// Message set short names that make up this programme
    pub fn message_sets(&self) -> &'static [&'static str] {
        match self {
            Programme::MomConnect => &["subscription", "chw", "standard", "later", "accelerated"],
            Programme::NurseConnect => &["nurseconnect"],
        }
    }

    /// Whether a message set short name belongs to this programme
    pub fn includes(&self, short_name: &str) -> bool {
        self.message_sets().contains(&short_name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Programme::MomConnect => "momconnect",
            Programme::NurseConnect => "nurseconnect",
        }
    }
}

impl fmt::Display for Programme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message sets shipped with every deployment, as `(id, short_name)`
pub const DEFAULT_MESSAGE_SETS: &[(u64, &str)] = &[
    (1, "standard"),
    (2, "later"),
    (3, "accelerated"),
    (4, "baby1"),
    (5, "baby2"),
    (6, "miscarriage"),
    (7, "stillbirth"),
    (8, "babyloss"),
    (9, "subscription"),
    (10, "chw"),
    (11, "nurseconnect"),
];

/// A named, ordered collection of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSet {
    pub id: MessageSetId,
    pub short_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Set to roll on to once this one completes
    #[serde(default)]
    pub next_set: Option<MessageSetId>,
    #[serde(default)]
    pub default_schedule: Option<ScheduleId>,
    #[serde(default)]
    pub conversation_key: Option<String>,
}

impl MessageSet {
    pub fn new(id: u64, short_name: impl Into<String>) -> Self {
        Self {
            id: MessageSetId(id),
            short_name: short_name.into(),
            notes: None,
            next_set: None,
            default_schedule: None,
            conversation_key: None,
        }
    }
}

/// One message of a set in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_set: MessageSetId,
    pub sequence_number: u32,
    pub lang: String,
    pub content: String,
}

/// A phone number's enrolment in a message set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub contact_key: ContactKey,
    pub to_addr: Msisdn,
    pub user_account: Option<String>,
    pub lang: String,
    pub message_set: MessageSetId,
    pub schedule: ScheduleId,
    pub next_sequence_number: u32,
    pub active: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a subscription
///
/// New subscriptions always start active and incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub contact_key: ContactKey,
    pub to_addr: Msisdn,
    pub user_account: Option<String>,
    pub lang: String,
    pub message_set: MessageSetId,
    pub schedule: ScheduleId,
    pub next_sequence_number: u32,
}

impl NewSubscription {
    /// Copy of an existing subscription's position, retargeted at another contact
    pub fn transferred_from(
        existing: &Subscription,
        contact_key: ContactKey,
        to_addr: Msisdn,
        user_account: Option<String>,
    ) -> Self {
        Self {
            contact_key,
            to_addr,
            user_account,
            lang: existing.lang.clone(),
            message_set: existing.message_set,
            schedule: existing.schedule,
            next_sequence_number: existing.next_sequence_number,
        }
    }

    pub fn into_subscription(self, id: SubscriptionId, now: DateTime<Utc>) -> Subscription {
        Subscription {
            id,
            contact_key: self.contact_key,
            to_addr: self.to_addr,
            user_account: self.user_account,
            lang: self.lang,
            message_set: self.message_set,
            schedule: self.schedule,
            next_sequence_number: self.next_sequence_number,
            active: true,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programme_membership() {
        assert!(Programme::MomConnect.includes("accelerated"));
        assert!(Programme::MomConnect.includes("chw"));
        assert!(!Programme::MomConnect.includes("nurseconnect"));
        assert!(!Programme::MomConnect.includes("baby1"));
        assert!(Programme::NurseConnect.includes("nurseconnect"));
    }

    #[test]
    fn test_default_message_set_ids() {
        let id_of = |name: &str| {
            DEFAULT_MESSAGE_SETS
                .iter()
                .find(|(_, n)| *n == name)
                .map(|(id, _)| *id)
        };
        assert_eq!(id_of("standard"), Some(1));
        assert_eq!(id_of("accelerated"), Some(3));
        assert_eq!(id_of("subscription"), Some(9));
        assert_eq!(id_of("nurseconnect"), Some(11));
    }

    #[test]
    fn test_transfer_copies_position() {
        let now = Utc::now();
        let old = NewSubscription {
            contact_key: ContactKey::new("oldkey").unwrap(),
            to_addr: Msisdn::new("+27820010001").unwrap(),
            user_account: Some("knownaccount".to_string()),
            lang: "en".to_string(),
            message_set: MessageSetId(1),
            schedule: ScheduleId(3),
            next_sequence_number: 17,
        }
        .into_subscription(SubscriptionId(1), now);

        let moved = NewSubscription::transferred_from(
            &old,
            ContactKey::new("newkey").unwrap(),
            Msisdn::new("+27001").unwrap(),
            None,
        )
        .into_subscription(SubscriptionId(2), now);

        assert!(moved.active);
        assert_eq!(moved.message_set, old.message_set);
        assert_eq!(moved.schedule, old.schedule);
        assert_eq!(moved.next_sequence_number, 17);
        assert_eq!(moved.to_addr.as_str(), "+27001");
    }
}
