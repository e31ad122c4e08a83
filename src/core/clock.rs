//! Time source for encounter timestamps and registration dates

use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2013, 8, 19, 14, 48, 11).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2013, 8, 19).unwrap());
    }
}
