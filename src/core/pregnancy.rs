//! Weeks-pregnant calculation
//!
//! Gestation is modelled as 40 weeks ending on the estimated due date. The
//! week count is `40 - floor(days_until_due / 7)`, never less than 2.

use crate::domain::registration::DATE_FORMAT;
use crate::domain::PlanError;
use chrono::{DateTime, NaiveDate, Utc};

/// Length of a full-term pregnancy in weeks
pub const FULL_TERM_WEEKS: i64 = 40;

/// Smallest value ever reported
pub const MIN_WEEKS: u32 = 2;

/// Weeks pregnant at registration time
///
/// `registered_at` is truncated to its date. `estimated_due_date` must be
/// `YYYY-MM-DD`.
///
/// # Errors
///
/// `PlanError::InvalidDueDate` when the due date does not parse.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use momconnect::core::pregnancy::weeks_pregnant;
///
/// let registered = Utc.with_ymd_and_hms(2014, 7, 6, 9, 0, 0).unwrap();
/// assert_eq!(weeks_pregnant(registered, "2014-07-14").unwrap(), 39);
/// ```
pub fn weeks_pregnant(
    registered_at: DateTime<Utc>,
    estimated_due_date: &str,
) -> Result<u32, PlanError> {
    let due = NaiveDate::parse_from_str(estimated_due_date.trim(), DATE_FORMAT)
        .map_err(|_| PlanError::InvalidDueDate(estimated_due_date.to_string()))?;
    Ok(weeks_pregnant_on(registered_at.date_naive(), due))
}

/// Weeks pregnant on a given date, for an already parsed due date
pub fn weeks_pregnant_on(registered_on: NaiveDate, due: NaiveDate) -> u32 {
    let days_remaining = (due - registered_on).num_days();
    let weeks = FULL_TERM_WEEKS - days_remaining.div_euclid(7);
    weeks.clamp(i64::from(MIN_WEEKS), i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 14, 48, 11).unwrap()
    }

    #[test_case(at(2014, 7, 13), "2014-07-14", 40 ; "one day before due")]
    #[test_case(at(2014, 7, 6), "2014-07-14", 39 ; "eight days before due")]
    #[test_case(at(2014, 1, 1), "2014-09-21", 3 ; "early pregnancy")]
    #[test_case(at(2014, 1, 1), "2014-10-03", 2 ; "clamped to two weeks")]
    #[test_case(at(2013, 8, 19), "2013-08-20", 40 ; "week 40")]
    #[test_case(at(2013, 8, 19), "2013-08-27", 39 ; "week 39")]
    #[test_case(at(2013, 8, 19), "2013-09-03", 38 ; "week 38")]
    #[test_case(at(2013, 8, 19), "2013-09-10", 37 ; "week 37")]
    #[test_case(at(2013, 8, 19), "2013-09-17", 36 ; "week 36")]
    #[test_case(at(2013, 8, 19), "2013-09-24", 35 ; "week 35")]
    #[test_case(at(2013, 8, 19), "2013-10-15", 32 ; "week 32")]
    #[test_case(at(2013, 8, 19), "2013-10-22", 31 ; "week 31")]
    #[test_case(at(2013, 8, 19), "2014-04-24", 5 ; "week 5")]
    #[test_case(at(2013, 8, 19), "2014-05-07", 3 ; "week 3")]
    fn test_weeks_pregnant(registered: DateTime<Utc>, edd: &str, expected: u32) {
        assert_eq!(weeks_pregnant(registered, edd).unwrap(), expected);
    }

    #[test]
    fn test_due_today_is_forty_weeks() {
        assert_eq!(weeks_pregnant(at(2014, 7, 14), "2014-07-14").unwrap(), 40);
    }

    #[test]
    fn test_past_due_date_floors_upward() {
        // one day overdue: floor(-1 / 7) = -1
        assert_eq!(weeks_pregnant(at(2014, 7, 15), "2014-07-14").unwrap(), 41);
    }

    #[test]
    fn test_invalid_due_date() {
        assert_eq!(
            weeks_pregnant(at(2014, 7, 15), "14/07/2014"),
            Err(PlanError::InvalidDueDate("14/07/2014".to_string()))
        );
    }
}
