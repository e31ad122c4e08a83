// MomConnect - Maternal health registration backend
// Copyright (c) 2025 MomConnect Contributors
// Licensed under the MIT License

//! # MomConnect
//!
//! Registration backend for a maternal health messaging service. Mothers
//! (registered by themselves, a community health worker or a clinic) and
//! nurses are stored, reported to the Jembi health information exchange and
//! synchronized with Vumi Go contacts and message subscriptions.
//!
//! ## Architecture
//!
//! - [`cli`] - command-line interface
//! - [`core`] - planning rules, jobs, dispatch, synchronization, intake
//! - [`adapters`] - Jembi, Vumi Go and the registration store
//! - [`domain`] - registrations, subscriptions, contacts and errors
//! - [`config`] - configuration loading and validation
//! - [`logging`] - structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use momconnect::adapters::jembi::LoggingJembi;
//! use momconnect::adapters::store::{MemoryStore, Store};
//! use momconnect::adapters::vumi::{InMemoryContacts, LoggingMetricSender};
//! use momconnect::config::{MetricsConfig, SubscriptionConfig};
//! use momconnect::core::clock::{Clock, SystemClock};
//! use momconnect::core::dispatch::NotificationDispatcher;
//! use momconnect::core::intake::RegistrationIntake;
//! use momconnect::core::jobs::JobRunner;
//! use momconnect::core::metrics::MetricEmitter;
//! use momconnect::core::sync::ContactSynchronizer;
//! use momconnect::domain::RegistrationDraft;
//! use std::sync::Arc;
//!
//! # async fn example(draft: RegistrationDraft) -> momconnect::domain::Result<()> {
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//! let metrics = Arc::new(MetricEmitter::new(
//!     Arc::new(LoggingMetricSender::new()),
//!     &MetricsConfig::default(),
//! ));
//!
//! let dispatcher = NotificationDispatcher::new(
//!     store.clone(),
//!     Arc::new(LoggingJembi::new()),
//!     metrics.clone(),
//!     JobRunner::default(),
//!     clock.clone(),
//! );
//! let synchronizer = ContactSynchronizer::new(
//!     store.clone(),
//!     Arc::new(InMemoryContacts::new()),
//!     metrics.clone(),
//!     JobRunner::default(),
//!     clock.clone(),
//!     SubscriptionConfig::default(),
//! );
//!
//! let intake = RegistrationIntake::new(store, clock, metrics, dispatcher, synchronizer);
//! let report = intake.submit(draft).await?;
//! println!("Registration {} stored", report.registration.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`] over [`domain::MomConnectError`];
//! `anyhow` appears only in the command handlers.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
