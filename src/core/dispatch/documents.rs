//! Jembi JSON documents built from stored registrations

use crate::adapters::jembi::{NurseRegistrationDocument, RegistrationDocument};
use crate::core::patient_id::format_patient_id;
use crate::domain::{Authority, NurseRegistration, Registration};
use chrono::{DateTime, NaiveDate, Utc};

/// Encounter timestamp layout
pub const ENCOUNTER_FORMAT: &str = "%Y%m%d%H%M%S";

/// Birth and due date layout
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

const MOTHER_MHA: u8 = 1;
const MOTHER_SWT: u8 = 1;
const NURSE_MHA: u8 = 1;
const NURSE_SWT: u8 = 3;
const NURSE_SUBSCRIPTION_TYPE: u8 = 7;

fn compact(date: NaiveDate) -> String {
    date.format(COMPACT_DATE_FORMAT).to_string()
}

/// Document for `json/subscription`
///
/// The due date is only included for clinic registrations.
pub fn registration_document(
    registration: &Registration,
    encountered_at: DateTime<Utc>,
) -> RegistrationDocument {
    let edd = match registration.authority {
        Authority::Clinic => registration.mom_edd.map(compact),
        Authority::Personal | Authority::Chw => None,
    };

    RegistrationDocument {
        mha: MOTHER_MHA,
        swt: MOTHER_SWT,
        dmsisdn: registration.hcw_msisdn.as_ref().map(|m| m.to_string()),
        cmsisdn: registration.mom_msisdn.to_string(),
        id: format_patient_id(&registration.identity, &registration.mom_msisdn),
        subscription_type: registration.authority.subscription_type_code(),
        lang: registration.mom_lang.clone(),
        encdate: encountered_at.format(ENCOUNTER_FORMAT).to_string(),
        faccode: registration.clinic_code.clone(),
        dob: registration.identity.dob().map(compact),
        edd,
    }
}

/// Document for `nc/subscription`
pub fn nurse_registration_document(
    registration: &NurseRegistration,
    encountered_at: DateTime<Utc>,
) -> NurseRegistrationDocument {
    NurseRegistrationDocument {
        mha: NURSE_MHA,
        swt: NURSE_SWT,
        subscription_type: NURSE_SUBSCRIPTION_TYPE,
        dmsisdn: registration.dmsisdn.to_string(),
        cmsisdn: registration.cmsisdn.to_string(),
        rmsisdn: registration.rmsisdn.as_ref().map(|m| m.to_string()),
        faccode: registration.faccode.clone(),
        id: format_patient_id(&registration.identity, &registration.cmsisdn),
        dob: registration.identity.dob().map(compact),
        persal: registration.persal_no.map(|p| p.to_string()),
        sanc: registration.sanc_reg_no.map(|s| s.to_string()),
        encdate: encountered_at.format(ENCOUNTER_FORMAT).to_string(),
    }
}
