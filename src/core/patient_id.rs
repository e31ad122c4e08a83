//! Patient identifier in the form Jembi expects
//!
//! `{id}^^^{assigning authority}^{id type}`: national ids and passports use
//! the document number, everyone else is identified by phone number.

use crate::domain::{Identity, Msisdn};

/// Formats the patient id for an identity, falling back to the phone number
///
/// # Examples
///
/// ```
/// use momconnect::core::patient_id::format_patient_id;
/// use momconnect::domain::{Identity, Msisdn};
///
/// let msisdn = Msisdn::new("+27002").unwrap();
/// assert_eq!(format_patient_id(&Identity::None, &msisdn), "27002^^^ZAF^TEL");
/// ```
pub fn format_patient_id(identity: &Identity, msisdn: &Msisdn) -> String {
    match identity {
        Identity::SaId { id_no, .. } => format!("{id_no}^^^ZAF^NI"),
        Identity::Passport { id_no, origin, .. } => {
            format!("{id_no}^^^{}^PPN", origin.to_uppercase())
        }
        Identity::None => format!("{}^^^ZAF^TEL", msisdn.digits()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn msisdn(s: &str) -> Msisdn {
        Msisdn::new(s).unwrap()
    }

    #[test]
    fn test_sa_id() {
        let identity = Identity::SaId {
            id_no: "8009151234001".to_string(),
            dob: NaiveDate::from_ymd_opt(1980, 9, 15),
        };
        assert_eq!(
            format_patient_id(&identity, &msisdn("+27001")),
            "8009151234001^^^ZAF^NI"
        );
    }

    #[test]
    fn test_passport_uppercases_origin() {
        let identity = Identity::Passport {
            id_no: "5551111".to_string(),
            origin: "zw".to_string(),
            dob: NaiveDate::from_ymd_opt(1980, 9, 15),
        };
        assert_eq!(
            format_patient_id(&identity, &msisdn("+27001")),
            "5551111^^^ZW^PPN"
        );
    }

    #[test]
    fn test_no_document_uses_phone() {
        assert_eq!(
            format_patient_id(&Identity::None, &msisdn("+27002")),
            "27002^^^ZAF^TEL"
        );
    }
}
