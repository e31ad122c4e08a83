//! External contact model and the typed extras patch
//!
//! Vumi Go contacts carry an open string map ("extras"). Registrations never
//! replace that map: they build an [`ExtrasPatch`] from a closed set of
//! [`ExtraKey`]s and merge it in, leaving keys they do not know about alone.

use super::ids::{ContactKey, GroupKey, Msisdn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Open extras map as stored on a contact
pub type Extras = BTreeMap<String, String>;

/// Contact record held by the contacts API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub key: ContactKey,
    pub msisdn: Msisdn,
    #[serde(default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupKey>,
    #[serde(default)]
    pub extra: Extras,
}

/// Body of a contact create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub msisdn: Msisdn,
    pub extra: Extras,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupKey>,
}

/// Body of a contact update call. Absent fields are left untouched upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extras>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupKey>>,
}

/// Contact group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: GroupKey,
    pub name: String,
}

/// Every extras key a registration may write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtraKey {
    IsRegistered,
    IsRegisteredBy,
    LanguageChoice,
    SourceName,
    LastRegId,
    RegisteredBy,
    IdType,
    SaId,
    PassportNo,
    PassportOrigin,
    Dob,
    ClinicCode,
    Edd,
    DueDateDay,
    DueDateMonth,
    DueDateYear,
    LastServiceRating,
    ServiceRatingReminders,
    ServiceRatingReminder,
    SubscriptionType,
    SubscriptionRate,
    SubscriptionSeqStart,
    NcSourceName,
    NcLastRegId,
    NcFaccode,
    NcIsRegistered,
    NcIdType,
    NcSaIdNo,
    NcPassportNum,
    NcPassportCountry,
    NcDob,
    NcRegisteredBy,
    NcPersal,
    NcSanc,
    NcSubscriptionType,
    NcSubscriptionRate,
    NcSubscriptionSeqStart,
}

impl ExtraKey {
    /// Key as written to the contact
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraKey::IsRegistered => "is_registered",
            ExtraKey::IsRegisteredBy => "is_registered_by",
            ExtraKey::LanguageChoice => "language_choice",
            ExtraKey::SourceName => "source_name",
            ExtraKey::LastRegId => "last_reg_id",
            ExtraKey::RegisteredBy => "registered_by",
            ExtraKey::IdType => "id_type",
            ExtraKey::SaId => "sa_id",
            ExtraKey::PassportNo => "passport_no",
            ExtraKey::PassportOrigin => "passport_origin",
            ExtraKey::Dob => "dob",
            ExtraKey::ClinicCode => "clinic_code",
            ExtraKey::Edd => "edd",
            ExtraKey::DueDateDay => "due_date_day",
            ExtraKey::DueDateMonth => "due_date_month",
            ExtraKey::DueDateYear => "due_date_year",
            ExtraKey::LastServiceRating => "last_service_rating",
            ExtraKey::ServiceRatingReminders => "service_rating_reminders",
            ExtraKey::ServiceRatingReminder => "service_rating_reminder",
            ExtraKey::SubscriptionType => "subscription_type",
            ExtraKey::SubscriptionRate => "subscription_rate",
            ExtraKey::SubscriptionSeqStart => "subscription_seq_start",
            ExtraKey::NcSourceName => "nc_source_name",
            ExtraKey::NcLastRegId => "nc_last_reg_id",
            ExtraKey::NcFaccode => "nc_faccode",
            ExtraKey::NcIsRegistered => "nc_is_registered",
            ExtraKey::NcIdType => "nc_id_type",
            ExtraKey::NcSaIdNo => "nc_sa_id_no",
            ExtraKey::NcPassportNum => "nc_passport_num",
            ExtraKey::NcPassportCountry => "nc_passport_country",
            ExtraKey::NcDob => "nc_dob",
            ExtraKey::NcRegisteredBy => "nc_registered_by",
            ExtraKey::NcPersal => "nc_persal",
            ExtraKey::NcSanc => "nc_sanc",
            ExtraKey::NcSubscriptionType => "nc_subscription_type",
            ExtraKey::NcSubscriptionRate => "nc_subscription_rate",
            ExtraKey::NcSubscriptionSeqStart => "nc_subscription_seq_start",
        }
    }
}

impl fmt::Display for ExtraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed set of extras to merge into a contact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtrasPatch {
    entries: BTreeMap<ExtraKey, String>,
}

impl ExtrasPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key, replacing any earlier value in this patch
    pub fn set(&mut self, key: ExtraKey, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key, value.into());
        self
    }

    /// Sets a key only when a value is present
    pub fn set_opt(&mut self, key: ExtraKey, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn get(&self, key: ExtraKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map union preferring the patch's values; untouched keys survive
    pub fn merge_into(&self, extras: &Extras) -> Extras {
        let mut merged = extras.clone();
        for (key, value) in &self.entries {
            merged.insert(key.as_str().to_string(), value.clone());
        }
        merged
    }

    /// The patch as a fresh extras map
    pub fn into_extras(self) -> Extras {
        self.merge_into(&Extras::new())
    }
}

/// Union of group memberships, keeping existing order and appending new keys
pub fn merge_groups(existing: &[GroupKey], additional: &[GroupKey]) -> Vec<GroupKey> {
    let mut merged = existing.to_vec();
    for key in additional {
        if !merged.contains(key) {
            merged.push(key.clone());
        }
    }
    merged
}
