//! Earnings proximity checks against the external calendar.

use allocguard_core::traits::EarningsCalendar;
use allocguard_core::types::EarningsProximity;
use anyhow::Result;
use chrono::{Duration, NaiveDate};

pub const DEFAULT_THRESHOLD_DAYS: u32 = 3;

pub struct EarningsChecker {
    calendar: Box<dyn EarningsCalendar>,
    threshold_days: u32,
}

impl EarningsChecker {
    pub fn new(calendar: Box<dyn EarningsCalendar>, threshold_days: u32) -> Self {
        Self {
            calendar,
            threshold_days,
        }
    }

    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Whether earnings are approaching for `ticker`. The threshold is
    /// boundary inclusive: exactly `threshold_days` away counts as within.
    pub fn check_proximity(
        &self,
        ticker: &str,
        reference_date: NaiveDate,
    ) -> Result<EarningsProximity> {
        let Some(entry) = self.calendar.next_earnings(ticker, reference_date)? else {
            return Ok(EarningsProximity::none(ticker, self.threshold_days));
        };
        let days_until = (entry.earnings_date - reference_date).num_days();
        Ok(EarningsProximity {
            ticker: ticker.to_string(),
            has_upcoming_earnings: true,
            days_until_earnings: Some(days_until),
            earnings_date: Some(entry.earnings_date),
            time_of_day: Some(entry.time_of_day),
            is_within_threshold: days_until <= i64::from(self.threshold_days),
            threshold_days: self.threshold_days,
        })
    }

    /// Whether `ticker` sits in an earnings blackout window: within
    /// `threshold_days` before or after an announcement.
    pub fn is_blackout(&self, ticker: &str, reference_date: NaiveDate) -> Result<bool> {
        let proximity = self.check_proximity(ticker, reference_date)?;
        if proximity.is_within_threshold {
            return Ok(true);
        }
        // Look back for a recent announcement.
        let past_date = reference_date - Duration::days(i64::from(self.threshold_days));
        if let Some(entry) = self.calendar.next_earnings(ticker, past_date)? {
            if entry.earnings_date <= reference_date {
                let days_since = (reference_date - entry.earnings_date).num_days();
                if days_since <= i64::from(self.threshold_days) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocguard_core::memory::MemoryEarningsCalendar;
    use allocguard_core::types::EarningsEntry;

    fn calendar_with(dates: &[(u32, u32)]) -> Box<MemoryEarningsCalendar> {
        let mut calendar = MemoryEarningsCalendar::new();
        for (month, day) in dates {
            calendar.push(EarningsEntry {
                ticker: "ACME".into(),
                earnings_date: NaiveDate::from_ymd_opt(2024, *month, *day).unwrap(),
                time_of_day: "AMC".into(),
                fiscal_quarter: None,
                source: "test".into(),
            });
        }
        Box::new(calendar)
    }

    #[test]
    fn threshold_is_boundary_inclusive() {
        let checker = EarningsChecker::new(calendar_with(&[(5, 4)]), 3);
        let reference = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let prox = checker.check_proximity("ACME", reference).unwrap();
        assert!(prox.has_upcoming_earnings);
        assert_eq!(prox.days_until_earnings, Some(3));
        assert!(prox.is_within_threshold, "exactly N days counts as within");
    }

    #[test]
    fn outside_threshold_is_not_a_warning() {
        let checker = EarningsChecker::new(calendar_with(&[(5, 10)]), 3);
        let reference = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let prox = checker.check_proximity("ACME", reference).unwrap();
        assert!(prox.has_upcoming_earnings);
        assert_eq!(prox.days_until_earnings, Some(9));
        assert!(!prox.is_within_threshold);
    }

    #[test]
    fn same_day_earnings_count_as_within() {
        let checker = EarningsChecker::new(calendar_with(&[(5, 1)]), 3);
        let reference = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let prox = checker.check_proximity("ACME", reference).unwrap();
        assert_eq!(prox.days_until_earnings, Some(0));
        assert!(prox.is_within_threshold);
    }

    #[test]
    fn no_calendar_entry_means_no_warning() {
        let checker = EarningsChecker::new(Box::new(MemoryEarningsCalendar::new()), 3);
        let reference = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let prox = checker.check_proximity("ACME", reference).unwrap();
        assert!(!prox.has_upcoming_earnings);
        assert!(!prox.is_within_threshold);
        assert!(prox.warning_message().is_none());
    }

    #[test]
    fn blackout_covers_both_sides_of_the_announcement() {
        let checker = EarningsChecker::new(calendar_with(&[(5, 10)]), 3);
        let before = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        assert!(checker.is_blackout("ACME", before).unwrap());
        let after = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        assert!(checker.is_blackout("ACME", after).unwrap());
        let clear = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert!(!checker.is_blackout("ACME", clear).unwrap());
        let long_before = NaiveDate::from_ymd_opt(2024, 4, 20).unwrap();
        assert!(!checker.is_blackout("ACME", long_before).unwrap());
    }
}
