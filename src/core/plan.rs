//! Subscription plan resolution
//!
//! Personal and community-health-worker registrations get a fixed plan.
//! Clinic registrations are banded by weeks pregnant using an ordered table
//! of inclusive ranges; a week that no band covers is an error, never a guess.

use crate::config::SubscriptionConfig;
use crate::domain::{Authority, PlanError, ScheduleId};
use serde::Serialize;
use std::fmt;

/// Every delivery rate name a plan can produce
pub const RATE_NAMES: &[&str] = &[
    "daily",
    "one_per_week",
    "two_per_week",
    "three_per_week",
    "four_per_week",
    "five_per_week",
];

/// Message set, delivery rate and first message of a new subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscriptionPlan {
    pub message_set: &'static str,
    pub rate: &'static str,
    pub seq_start: u32,
}

impl SubscriptionPlan {
    const fn new(message_set: &'static str, rate: &'static str, seq_start: u32) -> Self {
        Self {
            message_set,
            rate,
            seq_start,
        }
    }

    /// Schedule configured for this plan's rate
    pub fn schedule(&self, config: &SubscriptionConfig) -> Result<ScheduleId, PlanError> {
        config
            .schedule_for(self.rate)
            .map(ScheduleId)
            .ok_or_else(|| PlanError::UnknownRate(self.rate.to_string()))
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} from message {}",
            self.message_set, self.rate, self.seq_start
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Start {
    Fixed(u32),
    /// Two messages per week already missed since week 4
    TwoPerWeekSinceWeekFour,
}

#[derive(Debug, Clone, Copy)]
struct Band {
    lo: u32,
    hi: u32,
    message_set: &'static str,
    rate: &'static str,
    start: Start,
}

const fn band(lo: u32, hi: u32, message_set: &'static str, rate: &'static str, start: Start) -> Band {
    Band {
        lo,
        hi,
        message_set,
        rate,
        start,
    }
}

/// Clinic bands, evaluated top-down
const CLINIC_BANDS: &[Band] = &[
    band(39, 40, "accelerated", "daily", Start::Fixed(1)),
    band(38, 38, "accelerated", "five_per_week", Start::Fixed(1)),
    band(37, 37, "accelerated", "four_per_week", Start::Fixed(1)),
    band(36, 36, "accelerated", "three_per_week", Start::Fixed(1)),
    band(35, 35, "later", "three_per_week", Start::Fixed(13)),
    band(32, 34, "later", "three_per_week", Start::Fixed(4)),
    band(5, 31, "standard", "two_per_week", Start::TwoPerWeekSinceWeekFour),
];

const PERSONAL_PLAN: SubscriptionPlan = SubscriptionPlan::new("subscription", "two_per_week", 1);
const CHW_PLAN: SubscriptionPlan = SubscriptionPlan::new("chw", "two_per_week", 1);
const NURSE_PLAN: SubscriptionPlan = SubscriptionPlan::new("nurseconnect", "three_per_week", 1);

/// Resolves the plan for a registration channel
///
/// `weeks_pregnant` is only consulted for clinic registrations.
///
/// # Errors
///
/// - `PlanError::MissingWeeks` for a clinic registration without a week count
/// - `PlanError::NoPlanForWeek` when no clinic band covers the week
///
/// # Examples
///
/// ```
/// use momconnect::core::plan::resolve_plan;
/// use momconnect::domain::Authority;
///
/// let plan = resolve_plan(Authority::Clinic, Some(35)).unwrap();
/// assert_eq!((plan.message_set, plan.rate, plan.seq_start), ("later", "three_per_week", 13));
/// ```
pub fn resolve_plan(
    authority: Authority,
    weeks_pregnant: Option<u32>,
) -> Result<SubscriptionPlan, PlanError> {
    match authority {
        Authority::Personal => Ok(PERSONAL_PLAN),
        Authority::Chw => Ok(CHW_PLAN),
        Authority::Clinic => {
            let weeks = weeks_pregnant.ok_or(PlanError::MissingWeeks)?;
            clinic_plan(weeks)
        }
    }
}

fn clinic_plan(weeks: u32) -> Result<SubscriptionPlan, PlanError> {
    let band = CLINIC_BANDS
        .iter()
        .find(|b| (b.lo..=b.hi).contains(&weeks))
        .ok_or(PlanError::NoPlanForWeek { weeks })?;

    let seq_start = match band.start {
        Start::Fixed(n) => n,
        Start::TwoPerWeekSinceWeekFour => (weeks - 4) * 2 - 1,
    };

    Ok(SubscriptionPlan::new(band.message_set, band.rate, seq_start))
}

/// NurseConnect has a single plan
pub fn nurse_plan() -> SubscriptionPlan {
    NURSE_PLAN
}
