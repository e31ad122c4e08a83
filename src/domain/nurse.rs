//! NurseConnect registration model

use super::ids::{Msisdn, NurseRegistrationId};
use super::registration::{
    build_identity, invalid, non_blank, optional_msisdn, required_msisdn, IdType, Identity,
    Source,
};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unvalidated nurse registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NurseRegistrationDraft {
    #[serde(default)]
    pub cmsisdn: Option<String>,
    #[serde(default)]
    pub dmsisdn: Option<String>,
    #[serde(default)]
    pub rmsisdn: Option<String>,
    #[serde(default)]
    pub faccode: Option<String>,
    #[serde(default)]
    pub id_type: Option<IdType>,
    #[serde(default)]
    pub id_no: Option<String>,
    #[serde(default)]
    pub passport_origin: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub nurse_source: Option<String>,
    #[serde(default)]
    pub persal_no: Option<u64>,
    #[serde(default)]
    pub sanc_reg_no: Option<u64>,
    #[serde(default)]
    pub opted_out: Option<bool>,
    #[serde(default)]
    pub optout_reason: Option<String>,
    #[serde(default)]
    pub optout_count: Option<u32>,
}

impl NurseRegistrationDraft {
    /// Validates the draft
    ///
    /// `dmsisdn` falls back to `cmsisdn` and a missing `id_type` is treated as
    /// `none`.
    pub fn validate(self) -> Result<NewNurseRegistration> {
        let cmsisdn = required_msisdn(self.cmsisdn, "cmsisdn")?;
        let dmsisdn = optional_msisdn(self.dmsisdn, "dmsisdn")?.unwrap_or_else(|| cmsisdn.clone());
        let rmsisdn = optional_msisdn(self.rmsisdn, "rmsisdn")?;
        let faccode = non_blank(self.faccode).ok_or_else(|| invalid("faccode is required"))?;
        let source_name =
            non_blank(self.nurse_source).ok_or_else(|| invalid("nurse_source is required"))?;

        let identity = build_identity(
            self.id_type.unwrap_or(IdType::None),
            self.id_no,
            self.passport_origin,
            self.dob,
            false,
            "",
        )?;

        let opt_out = if self.opted_out.unwrap_or(false) {
            let reason = non_blank(self.optout_reason)
                .ok_or_else(|| invalid("optout_reason is required when opted_out is true"))?;
            let count = self.optout_count.unwrap_or(0);
            if count == 0 {
                return Err(invalid("optout_count must be positive when opted_out is true"));
            }
            Some(OptOut { reason, count })
        } else {
            None
        };

        Ok(NewNurseRegistration {
            cmsisdn,
            dmsisdn,
            rmsisdn,
            faccode,
            identity,
            nurse_source: Source { name: source_name },
            persal_no: self.persal_no,
            sanc_reg_no: self.sanc_reg_no,
            opt_out,
        })
    }
}

/// Opt-out details recorded with a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptOut {
    pub reason: String,
    pub count: u32,
}

/// A validated nurse registration awaiting storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNurseRegistration {
    pub cmsisdn: Msisdn,
    pub dmsisdn: Msisdn,
    pub rmsisdn: Option<Msisdn>,
    pub faccode: String,
    pub identity: Identity,
    pub nurse_source: Source,
    pub persal_no: Option<u64>,
    pub sanc_reg_no: Option<u64>,
    pub opt_out: Option<OptOut>,
}

impl NewNurseRegistration {
    /// Attaches the store-assigned id and creation time
    pub fn into_registration(self, id: NurseRegistrationId, now: DateTime<Utc>) -> NurseRegistration {
        NurseRegistration {
            id,
            cmsisdn: self.cmsisdn,
            dmsisdn: self.dmsisdn,
            rmsisdn: self.rmsisdn,
            faccode: self.faccode,
            identity: self.identity,
            nurse_source: self.nurse_source,
            persal_no: self.persal_no,
            sanc_reg_no: self.sanc_reg_no,
            opt_out: self.opt_out,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored nurse registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NurseRegistration {
    pub id: NurseRegistrationId,
    pub cmsisdn: Msisdn,
    pub dmsisdn: Msisdn,
    pub rmsisdn: Option<Msisdn>,
    pub faccode: String,
    pub identity: Identity,
    pub nurse_source: Source,
    pub persal_no: Option<u64>,
    pub sanc_reg_no: Option<u64>,
    pub opt_out: Option<OptOut>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NurseRegistration {
    /// Device number, when the nurse was registered from someone else's phone
    pub fn registered_by(&self) -> Option<&Msisdn> {
        Some(&self.dmsisdn).filter(|d| **d != self.cmsisdn)
    }
}
