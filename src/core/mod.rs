//! Core business logic for MomConnect.
//!
//! # Modules
//!
//! Pure rules:
//! - [`pregnancy`] - weeks pregnant from a due date
//! - [`plan`] - message set, rate and start position for a registration
//! - [`patient_id`] - Jembi patient identifier
//! - [`extras`] - contact extras derived from registrations and subscriptions
//! - [`rating`] - clinic service-rating dashboard
//!
//! Orchestration:
//! - [`jobs`] - retry policy and job runner
//! - [`metrics`] - fire-and-forget metric emission
//! - [`dispatch`] - Jembi notification jobs
//! - [`sync`] - contact and subscription reconciliation
//! - [`intake`] - registration submission
//!
//! # Registration Workflow
//!
//! 1. **Validate**: the draft is checked against the field rules
//! 2. **Store**: the registration is persisted and gets its id
//! 3. **Notify**: the Jembi document is posted, with retry on server errors
//! 4. **Synchronize**: the contact is created or updated and the subscription
//!    is created, transferred or left alone
//!
//! Steps 3 and 4 run concurrently and report their own metrics.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use momconnect::core::plan::resolve_plan;
//! use momconnect::core::pregnancy::weeks_pregnant;
//! use momconnect::domain::Authority;
//!
//! let registered = Utc.with_ymd_and_hms(2013, 8, 19, 9, 0, 0).unwrap();
//! let weeks = weeks_pregnant(registered, "2013-09-24").unwrap();
//! let plan = resolve_plan(Authority::Clinic, Some(weeks)).unwrap();
//!
//! assert_eq!(weeks, 35);
//! assert_eq!(plan.message_set, "later");
//! assert_eq!(plan.seq_start, 13);
//! ```

pub mod clock;
pub mod dispatch;
pub mod extras;
pub mod intake;
pub mod jobs;
pub mod metrics;
pub mod patient_id;
pub mod plan;
pub mod pregnancy;
pub mod rating;
pub mod sync;
