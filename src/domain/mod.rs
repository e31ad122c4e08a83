//! Domain models and types for MomConnect.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Msisdn`], [`RegistrationId`], [`ContactKey`])
//! - **Registration models** ([`RegistrationDraft`] validated into [`NewRegistration`],
//!   stored as [`Registration`]; the NurseConnect equivalents in [`nurse`])
//! - **Messaging models** ([`Subscription`], [`MessageSet`], [`Contact`], [`ExtrasPatch`])
//! - **Error types** ([`MomConnectError`], [`JembiError`], [`VumiError`], [`PlanError`], [`JobError`])
//! - **Result type alias** ([`Result`])
//!
//! # Validation
//!
//! Field requiredness depends on the identity type and the registration
//! authority. Drafts that break those rules never become registrations:
//!
//! ```rust
//! use momconnect::domain::{Authority, IdType, RegistrationDraft};
//!
//! let draft = RegistrationDraft {
//!     mom_msisdn: Some("+27001".to_string()),
//!     mom_id_type: Some(IdType::Passport),
//!     mom_id_no: Some("5551111".to_string()),
//!     mom_dob: Some("1980-09-15".to_string()),
//!     mom_lang: Some("en".to_string()),
//!     authority: Some(Authority::Personal),
//!     source: Some("USSD".to_string()),
//!     ..Default::default()
//! };
//!
//! // Passport registrations need the issuing country
//! assert!(draft.validate().is_err());
//! ```

pub mod contact;
pub mod context;
pub mod errors;
pub mod ids;
pub mod nurse;
pub mod registration;
pub mod result;
pub mod subscription;

// Re-export commonly used types for convenience
pub use contact::{Contact, ContactUpdate, ExtraKey, Extras, ExtrasPatch, Group, NewContact};
pub use errors::{JembiError, JobError, MomConnectError, PlanError, VumiError};
pub use ids::{
    ContactKey, GroupKey, MessageSetId, Msisdn, NurseRegistrationId, RegistrationId, ScheduleId,
    SubscriptionId,
};
pub use nurse::{NewNurseRegistration, NurseRegistration, NurseRegistrationDraft};
pub use registration::{
    Authority, IdType, Identity, NewRegistration, Registration, RegistrationDraft, Source,
};
pub use result::Result;
pub use subscription::{Message, MessageSet, NewSubscription, Programme, Subscription};
