//! Mother registration model
//!
//! A registration arrives as a loosely-typed [`RegistrationDraft`] (the JSON a
//! mobile front end posts) and is validated into a [`NewRegistration`] whose
//! identity and channel rules are enforced by construction. The store assigns
//! an id and timestamps to produce the immutable [`Registration`].

use super::ids::{Msisdn, RegistrationId};
use crate::domain::{MomConnectError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by every date-only field on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identity document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// South African national id
    SaId,
    /// Foreign passport
    Passport,
    /// No identity document supplied
    None,
}

impl IdType {
    /// Wire name (`sa_id`, `passport`, `none`)
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::SaId => "sa_id",
            IdType::Passport => "passport",
            IdType::None => "none",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who initiated the registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    /// The mother registered herself
    Personal,
    /// A community health worker registered the mother
    Chw,
    /// A clinic registered the mother
    Clinic,
}

impl Authority {
    /// Wire name (`personal`, `chw`, `clinic`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Personal => "personal",
            Authority::Chw => "chw",
            Authority::Clinic => "clinic",
        }
    }

    /// Subscription type code Jembi expects in the `type` field
    pub fn subscription_type_code(&self) -> u8 {
        match self {
            Authority::Personal => 1,
            Authority::Chw => 2,
            Authority::Clinic => 3,
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Authority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Authority::Personal),
            "chw" => Ok(Authority::Chw),
            "clinic" => Ok(Authority::Clinic),
            other => Err(format!(
                "Invalid authority '{other}'. Must be one of: personal, chw, clinic"
            )),
        }
    }
}

/// Validated identity of the registrant
///
/// Each variant carries exactly the companion fields its document type needs.
/// Mother registrations always carry a date of birth for documented
/// identities; nurse registrations may omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id_type", rename_all = "snake_case")]
pub enum Identity {
    /// National id number
    SaId {
        id_no: String,
        dob: Option<NaiveDate>,
    },
    /// Passport number and issuing country
    Passport {
        id_no: String,
        origin: String,
        dob: Option<NaiveDate>,
    },
    /// No document
    None,
}

impl Identity {
    /// Document type of this identity
    pub fn id_type(&self) -> IdType {
        match self {
            Identity::SaId { .. } => IdType::SaId,
            Identity::Passport { .. } => IdType::Passport,
            Identity::None => IdType::None,
        }
    }

    /// Document number, if any
    pub fn id_no(&self) -> Option<&str> {
        match self {
            Identity::SaId { id_no, .. } | Identity::Passport { id_no, .. } => Some(id_no),
            Identity::None => None,
        }
    }

    /// Passport issuing country, if any
    pub fn passport_origin(&self) -> Option<&str> {
        match self {
            Identity::Passport { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// Date of birth, if any
    pub fn dob(&self) -> Option<NaiveDate> {
        match self {
            Identity::SaId { dob, .. } | Identity::Passport { dob, .. } => *dob,
            Identity::None => None,
        }
    }
}

/// Source application that submitted a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display name copied into contact extras
    pub name: String,
}

/// Unvalidated registration as posted by a front end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    #[serde(default)]
    pub hcw_msisdn: Option<String>,
    #[serde(default)]
    pub mom_msisdn: Option<String>,
    #[serde(default)]
    pub mom_id_type: Option<IdType>,
    #[serde(default)]
    pub mom_id_no: Option<String>,
    #[serde(default)]
    pub mom_passport_origin: Option<String>,
    #[serde(default)]
    pub mom_dob: Option<String>,
    #[serde(default)]
    pub mom_lang: Option<String>,
    #[serde(default)]
    pub mom_edd: Option<String>,
    #[serde(default)]
    pub clinic_code: Option<String>,
    #[serde(default)]
    pub authority: Option<Authority>,
    #[serde(default)]
    pub consent: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RegistrationDraft {
    /// Validates field combinations and parses dates
    ///
    /// # Errors
    ///
    /// Returns `MomConnectError::Validation` naming the first offending field.
    pub fn validate(self) -> Result<NewRegistration> {
        let mom_msisdn = required_msisdn(self.mom_msisdn, "mom_msisdn")?;
        let hcw_msisdn = optional_msisdn(self.hcw_msisdn, "hcw_msisdn")?;
        let authority = self
            .authority
            .ok_or_else(|| invalid("authority is required"))?;
        let id_type = self
            .mom_id_type
            .ok_or_else(|| invalid("mom_id_type is required"))?;
        let mom_lang = non_blank(self.mom_lang).ok_or_else(|| invalid("mom_lang is required"))?;
        let source_name = non_blank(self.source).ok_or_else(|| invalid("source is required"))?;

        let identity = build_identity(
            id_type,
            self.mom_id_no,
            self.mom_passport_origin,
            self.mom_dob,
            true,
            "mom_",
        )?;

        let mom_edd = non_blank(self.mom_edd)
            .map(|edd| parse_date(&edd, "mom_edd"))
            .transpose()?;
        let clinic_code = non_blank(self.clinic_code);

        if authority == Authority::Clinic {
            if mom_edd.is_none() {
                return Err(invalid("mom_edd is required for clinic registrations"));
            }
            if clinic_code.is_none() {
                return Err(invalid("clinic_code is required for clinic registrations"));
            }
        }

        Ok(NewRegistration {
            hcw_msisdn,
            mom_msisdn,
            identity,
            mom_lang,
            mom_edd,
            clinic_code,
            authority,
            consent: self.consent.unwrap_or(false),
            source: Source { name: source_name },
        })
    }
}

/// A validated registration that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub hcw_msisdn: Option<Msisdn>,
    pub mom_msisdn: Msisdn,
    pub identity: Identity,
    pub mom_lang: String,
    pub mom_edd: Option<NaiveDate>,
    pub clinic_code: Option<String>,
    pub authority: Authority,
    pub consent: bool,
    pub source: Source,
}

impl NewRegistration {
    /// Attaches the store-assigned id and creation time
    pub fn into_registration(self, id: RegistrationId, now: DateTime<Utc>) -> Registration {
        Registration {
            id,
            hcw_msisdn: self.hcw_msisdn,
            mom_msisdn: self.mom_msisdn,
            identity: self.identity,
            mom_lang: self.mom_lang,
            mom_edd: self.mom_edd,
            clinic_code: self.clinic_code,
            authority: self.authority,
            consent: self.consent,
            source: self.source,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored mother registration. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub hcw_msisdn: Option<Msisdn>,
    pub mom_msisdn: Msisdn,
    pub identity: Identity,
    pub mom_lang: String,
    pub mom_edd: Option<NaiveDate>,
    pub clinic_code: Option<String>,
    pub authority: Authority,
    pub consent: bool,
    pub source: Source,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Number that registered on the mother's behalf, when it differs from hers
    pub fn registered_by(&self) -> Option<&Msisdn> {
        self.hcw_msisdn
            .as_ref()
            .filter(|hcw| **hcw != self.mom_msisdn)
    }
}

pub(crate) fn invalid(message: impl Into<String>) -> MomConnectError {
    MomConnectError::Validation(message.into())
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn required_msisdn(value: Option<String>, field: &str) -> Result<Msisdn> {
    let raw = non_blank(value).ok_or_else(|| invalid(format!("{field} is required")))?;
    Msisdn::new(raw).map_err(|e| invalid(format!("{field}: {e}")))
}

pub(crate) fn optional_msisdn(value: Option<String>, field: &str) -> Result<Option<Msisdn>> {
    non_blank(value)
        .map(|raw| Msisdn::new(raw).map_err(|e| invalid(format!("{field}: {e}"))))
        .transpose()
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| invalid(format!("{field} must be a YYYY-MM-DD date, got '{value}'")))
}

/// Applies the document-type companion rules shared by mother and nurse registrations
pub(crate) fn build_identity(
    id_type: IdType,
    id_no: Option<String>,
    passport_origin: Option<String>,
    dob: Option<String>,
    dob_required: bool,
    prefix: &str,
) -> Result<Identity> {
    let dob = non_blank(dob)
        .map(|d| parse_date(&d, &format!("{prefix}dob")))
        .transpose()?;

    let require_dob = |dob: Option<NaiveDate>| -> Result<Option<NaiveDate>> {
        if dob_required && dob.is_none() {
            return Err(invalid(format!(
                "{prefix}dob is required when {prefix}id_type is {id_type}"
            )));
        }
        Ok(dob)
    };

    match id_type {
        IdType::SaId => {
            let id_no = non_blank(id_no).ok_or_else(|| {
                invalid(format!("{prefix}id_no is required when {prefix}id_type is sa_id"))
            })?;
            let dob = require_dob(dob)?;
            Ok(Identity::SaId { id_no, dob })
        }
        IdType::Passport => {
            let id_no = non_blank(id_no).ok_or_else(|| {
                invalid(format!(
                    "{prefix}id_no is required when {prefix}id_type is passport"
                ))
            })?;
            let origin = non_blank(passport_origin).ok_or_else(|| {
                invalid(format!(
                    "{prefix}passport_origin is required when {prefix}id_type is passport"
                ))
            })?;
            let dob = require_dob(dob)?;
            Ok(Identity::Passport { id_no, origin, dob })
        }
        IdType::None => Ok(Identity::None),
    }
}
