//! `plan` command: shows the subscription a registration would get

use crate::config::{load_config, SubscriptionConfig};
use crate::core::plan::{resolve_plan, SubscriptionPlan};
use crate::core::pregnancy::weeks_pregnant;
use crate::domain::Authority;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Args;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// personal, chw or clinic
    #[arg(long)]
    pub authority: Authority,

    /// Estimated due date (YYYY-MM-DD); used for clinic registrations
    #[arg(long)]
    pub edd: Option<String>,

    /// Registration date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub registered_on: Option<NaiveDate>,
}

impl PlanArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let registered_at = match self.registered_on {
            Some(day) => Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)),
            None => Utc::now(),
        };

        let weeks = match (&self.authority, &self.edd) {
            (Authority::Clinic, Some(edd)) => match weeks_pregnant(registered_at, edd) {
                Ok(weeks) => Some(weeks),
                Err(e) => {
                    println!("❌ {e}");
                    return Ok(2);
                }
            },
            _ => None,
        };

        let plan = match resolve_plan(self.authority, weeks) {
            Ok(plan) => plan,
            Err(e) => {
                println!("❌ {e}");
                return Ok(1);
            }
        };

        // Schedule ids come from the config file when there is one
        let subscriptions = load_config(config_path)
            .map(|c| c.subscription)
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Using default subscription rates");
                SubscriptionConfig::default()
            });

        print_plan(&plan, weeks, &subscriptions);
        Ok(0)
    }
}

fn print_plan(plan: &SubscriptionPlan, weeks: Option<u32>, subscriptions: &SubscriptionConfig) {
    println!("📅 Subscription plan");
    if let Some(weeks) = weeks {
        println!("  Weeks pregnant: {weeks}");
    }
    println!("  Message set: {}", plan.message_set);
    println!("  Rate: {}", plan.rate);
    match plan.schedule(subscriptions) {
        Ok(schedule) => println!("  Schedule: {schedule}"),
        Err(e) => println!("  Schedule: ⚠️ {e}"),
    }
    println!("  First message: {}", plan.seq_start);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(authority: Authority, edd: Option<&str>) -> PlanArgs {
        PlanArgs {
            authority,
            edd: edd.map(str::to_string),
            registered_on: NaiveDate::from_ymd_opt(2013, 8, 19),
        }
    }

    #[tokio::test]
    async fn test_clinic_plan() {
        let code = args(Authority::Clinic, Some("2013-09-24"))
            .execute("/nonexistent.toml")
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_bad_due_date() {
        let code = args(Authority::Clinic, Some("24/09/2013"))
            .execute("/nonexistent.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_clinic_without_due_date() {
        let code = args(Authority::Clinic, None)
            .execute("/nonexistent.toml")
            .await
            .unwrap();
        assert_eq!(code, 1);
    }
}
