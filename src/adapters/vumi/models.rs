//! Vumi Go wire models

use crate::domain::Group;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric aggregation kind understood by the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Min,
    Max,
    Last,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Last => "last",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub agg: Aggregation,
}

impl Metric {
    pub fn sum(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            agg: Aggregation::Sum,
        }
    }

    /// `[name, value, agg]`, the tuple shape `metrics.json` expects
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!([self.name, self.value, self.agg.as_str()])
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metric: '{}' [{}] -> {}", self.name, self.agg, self.value)
    }
}

/// One page of the groups listing
#[derive(Debug, Clone, Deserialize)]
pub struct GroupPage {
    #[serde(default)]
    pub data: Vec<Group>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One page of a contacts query
#[derive(Debug, Clone, Deserialize)]
pub struct ContactPage {
    #[serde(default)]
    pub data: Vec<crate::domain::Contact>,
    #[serde(default)]
    pub cursor: Option<String>,
}
