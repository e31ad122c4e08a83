//! Vumi Go integration: contacts API and HTTP API metrics

pub mod contacts;
pub mod memory;
pub mod metrics;
pub mod models;

pub use contacts::{ContactsApi, HttpContactsClient, CONTACT_NOT_FOUND_STATUS};
pub use memory::InMemoryContacts;
pub use metrics::{HttpMetricSender, LoggingMetricSender, MetricSender};
pub use models::{Aggregation, Metric};
