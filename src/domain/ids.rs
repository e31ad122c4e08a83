//! Domain identifier types with validation
//!
//! Newtype wrappers keep phone numbers, contact keys and record ids from
//! being mixed up across the registration, contact and subscription models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mobile number (MSISDN) newtype wrapper
///
/// Stored as supplied (usually `+27...`). Only emptiness is rejected; the
/// contacts API is the authority on number formats.
///
/// # Examples
///
/// ```
/// use momconnect::domain::ids::Msisdn;
///
/// let msisdn = Msisdn::new("+27001").unwrap();
/// assert_eq!(msisdn.digits(), "27001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Msisdn(String);

impl Msisdn {
    /// Creates a new Msisdn from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the number is empty or only whitespace
    pub fn new(msisdn: impl Into<String>) -> Result<Self, String> {
        let msisdn = msisdn.into();
        let trimmed = msisdn.trim();
        if trimmed.is_empty() {
            return Err("MSISDN cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the MSISDN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number with every `+` removed
    pub fn digits(&self) -> String {
        self.0.replace('+', "")
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Msisdn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Msisdn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Msisdn> for String {
    fn from(value: Msisdn) -> Self {
        value.0
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Local record id, assigned by the store
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw id
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Mother registration id
    RegistrationId
);
record_id!(
    /// Nurse registration id
    NurseRegistrationId
);
record_id!(
    /// Subscription id
    SubscriptionId
);
record_id!(
    /// Message set id, also written to contact extras as `subscription_type`
    MessageSetId
);
record_id!(
    /// Delivery schedule id, also written to contact extras as `subscription_rate`
    ScheduleId
);

/// Vumi Go contact key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactKey(String);

impl ContactKey {
    /// Creates a new ContactKey
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Contact key cannot be empty".to_string());
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vumi Go group key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Creates a new GroupKey
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
