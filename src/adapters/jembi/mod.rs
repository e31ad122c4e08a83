//! Jembi (health information exchange) integration

pub mod client;
pub mod dry_run;
pub mod models;

pub use client::{JembiApi, JembiClient};
pub use dry_run::LoggingJembi;
pub use models::{NurseRegistrationDocument, RegistrationDocument};
