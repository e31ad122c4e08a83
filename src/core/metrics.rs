//! Fire-and-forget metric emission
//!
//! Every metric is sent from its own spawned task, so a slow or failing
//! metrics endpoint never delays or fails the job that produced it.

use crate::adapters::vumi::{Metric, MetricSender};
use crate::config::MetricsConfig;
use crate::domain::{Authority, Programme};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Something worth counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent<'a> {
    /// Mother registration JSON posted to Jembi
    JsonToJembi { authority: Authority, success: bool },
    /// Mother registration dossier posted to Jembi
    DocToJembi { authority: Authority, success: bool },
    /// Nurse registration JSON posted to Jembi
    NurseJsonToJembi { success: bool },
    /// A MomConnect subscription was created
    Subscriptions,
    SubscriptionToProtocol { message_set: &'a str, success: bool },
    /// A NurseConnect subscription was created
    NurseSubscriptions,
    NurseSubscriptionToProtocol { success: bool },
    ContactSyncFail { programme: Programme },
    /// First nurse registration from a facility
    UniqueClinic,
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "fail"
    }
}

impl MetricEvent<'_> {
    /// Full metric name under the `env` prefix
    ///
    /// ```
    /// use momconnect::core::metrics::MetricEvent;
    /// use momconnect::domain::Authority;
    ///
    /// let event = MetricEvent::JsonToJembi { authority: Authority::Clinic, success: true };
    /// assert_eq!(event.name("qa"), "qa.clinic.sum.json_to_jembi_success");
    /// ```
    pub fn name(&self, env: &str) -> String {
        match self {
            MetricEvent::JsonToJembi { authority, success } => format!(
                "{env}.{}.sum.json_to_jembi_{}",
                authority.as_str(),
                outcome(*success)
            ),
            MetricEvent::DocToJembi { authority, success } => format!(
                "{env}.{}.sum.doc_to_jembi_{}",
                authority.as_str(),
                outcome(*success)
            ),
            MetricEvent::NurseJsonToJembi { success } => {
                format!("{env}.nursereg.sum.json_to_jembi_{}", outcome(*success))
            }
            MetricEvent::Subscriptions => format!("{env}.sum.subscriptions"),
            MetricEvent::SubscriptionToProtocol {
                message_set,
                success,
            } => format!(
                "{env}.{message_set}.sum.subscription_to_protocol_{}",
                outcome(*success)
            ),
            MetricEvent::NurseSubscriptions => format!("{env}.sum.nc_subscriptions"),
            MetricEvent::NurseSubscriptionToProtocol { success } => format!(
                "{env}.nurseconnect.sum.nc_subscription_to_protocol_{}",
                outcome(*success)
            ),
            MetricEvent::ContactSyncFail { programme } => {
                format!("{env}.{}.sum.contact_sync_fail", programme.as_str())
            }
            MetricEvent::UniqueClinic => format!("{env}.nurseconnect.unique.clinics"),
        }
    }
}

/// Builds metric names and hands metrics to a sender in the background
pub struct MetricEmitter {
    sender: Arc<dyn MetricSender>,
    env: String,
    enabled: bool,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl MetricEmitter {
    pub fn new(sender: Arc<dyn MetricSender>, config: &MetricsConfig) -> Self {
        Self {
            sender,
            env: config.env.clone(),
            enabled: config.enabled,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    /// Counts one occurrence of `event`
    pub fn record(&self, event: MetricEvent<'_>) {
        self.fire(Metric::sum(event.name(&self.env), 1.0));
    }

    /// Sends a metric without waiting for the result
    ///
    /// Send failures are logged and otherwise ignored.
    pub fn fire(&self, metric: Metric) {
        if !self.enabled {
            tracing::debug!(metric = %metric.name, "Metrics disabled, dropping");
            return;
        }

        let sender = Arc::clone(&self.sender);
        let handle = tokio::spawn(async move {
            if let Err(e) = sender.fire_metric(&metric).await {
                tracing::warn!(metric = %metric.name, error = %e, "Failed to fire metric");
            }
        });

        match self.pending.lock() {
            Ok(mut pending) => pending.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }

    /// Waits for every metric fired so far
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Metric task panicked");
            }
        }
    }
}
