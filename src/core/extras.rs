//! Contact extras derived from registrations and subscriptions

use crate::core::plan::SubscriptionPlan;
use crate::domain::registration::DATE_FORMAT;
use crate::domain::{
    ExtraKey, ExtrasPatch, Identity, NurseRegistration, Programme, Registration, Subscription,
};
use chrono::{Datelike, Duration};

/// Extras written for a mother registration
pub fn registration_extras(reg: &Registration) -> ExtrasPatch {
    let mut patch = ExtrasPatch::new();
    patch
        .set(ExtraKey::IsRegistered, "true")
        .set(ExtraKey::IsRegisteredBy, reg.authority.as_str())
        .set(ExtraKey::LanguageChoice, reg.mom_lang.as_str())
        .set(ExtraKey::SourceName, reg.source.name.as_str())
        .set(ExtraKey::LastRegId, reg.id.to_string())
        .set_opt(ExtraKey::RegisteredBy, reg.registered_by().map(|m| m.to_string()));

    patch.set(ExtraKey::IdType, reg.identity.id_type().as_str());
    match &reg.identity {
        Identity::SaId { id_no, .. } => {
            patch.set(ExtraKey::SaId, id_no.as_str());
        }
        Identity::Passport { id_no, origin, .. } => {
            patch
                .set(ExtraKey::PassportNo, id_no.as_str())
                .set(ExtraKey::PassportOrigin, origin.as_str());
        }
        Identity::None => {}
    }
    patch.set_opt(
        ExtraKey::Dob,
        reg.identity.dob().map(|d| d.format(DATE_FORMAT).to_string()),
    );

    if let (Some(clinic_code), Some(edd)) = (&reg.clinic_code, reg.mom_edd) {
        let reminder = reg.created_at.date_naive() + Duration::days(1);
        patch
            .set(ExtraKey::ClinicCode, clinic_code.as_str())
            .set(ExtraKey::Edd, edd.format(DATE_FORMAT).to_string())
            .set(ExtraKey::DueDateDay, edd.day().to_string())
            .set(ExtraKey::DueDateMonth, edd.month().to_string())
            .set(ExtraKey::DueDateYear, edd.year().to_string())
            .set(ExtraKey::LastServiceRating, "never")
            .set(ExtraKey::ServiceRatingReminders, "0")
            .set(
                ExtraKey::ServiceRatingReminder,
                reminder.format(DATE_FORMAT).to_string(),
            );
    }

    patch
}

/// Extras written for a nurse registration
pub fn nurse_registration_extras(reg: &NurseRegistration) -> ExtrasPatch {
    let mut patch = ExtrasPatch::new();
    patch
        .set(ExtraKey::NcSourceName, reg.nurse_source.name.as_str())
        .set(ExtraKey::NcLastRegId, reg.id.to_string())
        .set(ExtraKey::NcFaccode, reg.faccode.as_str())
        .set(ExtraKey::NcIsRegistered, "true");

    match &reg.identity {
        Identity::SaId { id_no, .. } => {
            patch
                .set(ExtraKey::NcIdType, "sa_id")
                .set(ExtraKey::NcSaIdNo, id_no.as_str());
        }
        Identity::Passport { id_no, origin, .. } => {
            patch
                .set(ExtraKey::NcIdType, "passport")
                .set(ExtraKey::NcPassportNum, id_no.as_str())
                .set(ExtraKey::NcPassportCountry, origin.as_str());
        }
        Identity::None => {}
    }

    patch
        .set_opt(
            ExtraKey::NcDob,
            reg.identity.dob().map(|d| d.format(DATE_FORMAT).to_string()),
        )
        .set_opt(ExtraKey::NcRegisteredBy, reg.registered_by().map(|m| m.to_string()))
        .set_opt(ExtraKey::NcPersal, reg.persal_no.map(|p| p.to_string()))
        .set_opt(ExtraKey::NcSanc, reg.sanc_reg_no.map(|s| s.to_string()));

    patch
}

/// Subscription position, under the programme's own keys
pub fn subscription_extras(programme: Programme, subscription: &Subscription) -> ExtrasPatch {
    let (set_key, rate_key, seq_key) = match programme {
        Programme::MomConnect => (
            ExtraKey::SubscriptionType,
            ExtraKey::SubscriptionRate,
            ExtraKey::SubscriptionSeqStart,
        ),
        Programme::NurseConnect => (
            ExtraKey::NcSubscriptionType,
            ExtraKey::NcSubscriptionRate,
            ExtraKey::NcSubscriptionSeqStart,
        ),
    };

    let mut patch = ExtrasPatch::new();
    patch
        .set(set_key, subscription.message_set.to_string())
        .set(rate_key, subscription.schedule.to_string())
        .set(seq_key, subscription.next_sequence_number.to_string());
    patch
}

/// Group names a mother joins: her language and her message set
pub fn group_names(reg: &Registration, plan: &SubscriptionPlan) -> Vec<String> {
    vec![reg.mom_lang.clone(), plan.message_set.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Authority, ContactKey, IdType, MessageSetId, Msisdn, NewSubscription,
        NurseRegistrationDraft, NurseRegistrationId, RegistrationDraft, RegistrationId,
        ScheduleId, SubscriptionId,
    };
    use chrono::{TimeZone, Utc};

    fn registration(draft: RegistrationDraft) -> Registration {
        draft
            .validate()
            .unwrap()
            .into_registration(
                RegistrationId(7),
                Utc.with_ymd_and_hms(2013, 8, 19, 14, 48, 11).unwrap(),
            )
    }

    fn clinic() -> RegistrationDraft {
        RegistrationDraft {
            hcw_msisdn: Some("+27820010001".to_string()),
            mom_msisdn: Some("+27001".to_string()),
            mom_id_type: Some(IdType::SaId),
            mom_id_no: Some("8009151234001".to_string()),
            mom_dob: Some("1980-09-15".to_string()),
            mom_lang: Some("en".to_string()),
            mom_edd: Some("2014-05-07".to_string()),
            clinic_code: Some("12345".to_string()),
            authority: Some(Authority::Clinic),
            source: Some("Clinic USSD".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clinic_extras() {
        let extras = registration_extras(&registration(clinic())).into_extras();
        assert_eq!(extras["is_registered"], "true");
        assert_eq!(extras["is_registered_by"], "clinic");
        assert_eq!(extras["language_choice"], "en");
        assert_eq!(extras["source_name"], "Clinic USSD");
        assert_eq!(extras["last_reg_id"], "7");
        assert_eq!(extras["registered_by"], "+27820010001");
        assert_eq!(extras["id_type"], "sa_id");
        assert_eq!(extras["sa_id"], "8009151234001");
        assert_eq!(extras["dob"], "1980-09-15");
        assert_eq!(extras["clinic_code"], "12345");
        assert_eq!(extras["edd"], "2014-05-07");
        assert_eq!(extras["due_date_day"], "7");
        assert_eq!(extras["due_date_month"], "5");
        assert_eq!(extras["due_date_year"], "2014");
        assert_eq!(extras["last_service_rating"], "never");
        assert_eq!(extras["service_rating_reminders"], "0");
        assert_eq!(extras["service_rating_reminder"], "2013-08-20");
    }

    #[test]
    fn test_personal_passport_extras() {
        let draft = RegistrationDraft {
            hcw_msisdn: None,
            mom_id_type: Some(IdType::Passport),
            mom_id_no: Some("5551111".to_string()),
            mom_passport_origin: Some("zw".to_string()),
            mom_edd: None,
            clinic_code: None,
            authority: Some(Authority::Personal),
            ..clinic()
        };
        let extras = registration_extras(&registration(draft)).into_extras();
        assert_eq!(extras["passport_no"], "5551111");
        assert_eq!(extras["passport_origin"], "zw");
        assert!(!extras.contains_key("sa_id"));
        assert!(!extras.contains_key("registered_by"));
        assert!(!extras.contains_key("clinic_code"));
        assert!(!extras.contains_key("service_rating_reminder"));
    }

    #[test]
    fn test_nurse_extras() {
        let reg = NurseRegistrationDraft {
            cmsisdn: Some("+27821234444".to_string()),
            dmsisdn: Some("+27821235555".to_string()),
            faccode: Some("123456".to_string()),
            id_type: Some(IdType::Passport),
            id_no: Some("Cub1234".to_string()),
            passport_origin: Some("cu".to_string()),
            dob: Some("1976-03-07".to_string()),
            nurse_source: Some("Nurse Source".to_string()),
            persal_no: Some(11114444),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .into_registration(NurseRegistrationId(3), Utc::now());

        let extras = nurse_registration_extras(&reg).into_extras();
        assert_eq!(extras["nc_source_name"], "Nurse Source");
        assert_eq!(extras["nc_last_reg_id"], "3");
        assert_eq!(extras["nc_faccode"], "123456");
        assert_eq!(extras["nc_is_registered"], "true");
        assert_eq!(extras["nc_id_type"], "passport");
        assert_eq!(extras["nc_passport_num"], "Cub1234");
        assert_eq!(extras["nc_passport_country"], "cu");
        assert_eq!(extras["nc_dob"], "1976-03-07");
        assert_eq!(extras["nc_registered_by"], "+27821235555");
        assert_eq!(extras["nc_persal"], "11114444");
        assert!(!extras.contains_key("nc_sanc"));
    }

    #[test]
    fn test_subscription_extras_per_programme() {
        let sub = NewSubscription {
            contact_key: ContactKey::new("knownuuid").unwrap(),
            to_addr: Msisdn::new("+27001").unwrap(),
            user_account: None,
            lang: "en".to_string(),
            message_set: MessageSetId(3),
            schedule: ScheduleId(1),
            next_sequence_number: 1,
        }
        .into_subscription(SubscriptionId(1), Utc::now());

        let mom = subscription_extras(Programme::MomConnect, &sub).into_extras();
        assert_eq!(mom["subscription_type"], "3");
        assert_eq!(mom["subscription_rate"], "1");
        assert_eq!(mom["subscription_seq_start"], "1");

        let nurse = subscription_extras(Programme::NurseConnect, &sub).into_extras();
        assert_eq!(nurse["nc_subscription_type"], "3");
        assert!(!nurse.contains_key("subscription_type"));
    }

    #[test]
    fn test_group_names() {
        let reg = registration(clinic());
        let plan = crate::core::plan::resolve_plan(Authority::Clinic, Some(5)).unwrap();
        assert_eq!(group_names(&reg, &plan), vec!["en", "standard"]);
    }
}
