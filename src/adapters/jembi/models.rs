//! Documents posted to Jembi

use serde::{Deserialize, Serialize};

/// Mother registration document (`json/subscription`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDocument {
    /// Protocol version marker
    pub mha: u8,
    /// Message subtype marker
    pub swt: u8,
    /// Device (health worker) number
    pub dmsisdn: Option<String>,
    /// Client (mother) number
    pub cmsisdn: String,
    /// Formatted patient id
    pub id: String,
    /// Subscription type code: personal 1, chw 2, clinic 3
    #[serde(rename = "type")]
    pub subscription_type: u8,
    pub lang: String,
    /// Encounter timestamp, `YYYYMMDDHHMMSS`
    pub encdate: String,
    pub faccode: Option<String>,
    /// `YYYYMMDD`
    pub dob: Option<String>,
    /// `YYYYMMDD`, clinic registrations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edd: Option<String>,
}

/// Nurse registration document (`nc/subscription`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NurseRegistrationDocument {
    pub mha: u8,
    pub swt: u8,
    #[serde(rename = "type")]
    pub subscription_type: u8,
    pub dmsisdn: String,
    pub cmsisdn: String,
    pub rmsisdn: Option<String>,
    pub faccode: String,
    pub id: String,
    pub dob: Option<String>,
    pub persal: Option<String>,
    pub sanc: Option<String>,
    pub encdate: String,
}
