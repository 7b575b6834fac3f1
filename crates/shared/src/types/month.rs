//! Billing-month arithmetic.
//!
//! Invoices are grouped by the calendar month of their date: duplicate
//! detection, invoice numbering, repricing and dashboard buckets all work
//! in month granularity. `BillingMonth` centralises the year/month math so
//! December rollover is handled in exactly one place.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a month string cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid billing month: {0}")]
pub struct ParseMonthError(String);

/// A calendar month (year + month), the grouping key of the billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a billing month, validating `month` is 1-12 and `year` fits
    /// the `YYYYMM` invoice-number prefix.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (1000..=9999).contains(&year))
            .then_some(Self { year, month })
    }

    /// The billing month a date falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Month and year are validated at construction, so this never falls
        // through to the default.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The following month, rolling over the year after December.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Half-open date range `[first_of_month, first_of_next_month)`.
    #[must_use]
    pub fn bounds(self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.next().first_day())
    }

    /// Returns true if `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        let (first, next_first) = self.bounds();
        date >= first && date < next_first
    }

    /// Dashboard/report label, e.g. `"2025-09"`.
    #[must_use]
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Invoice-number prefix form, e.g. `"202509"`.
    #[must_use]
    pub fn compact(self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for BillingMonth {
    type Err = ParseMonthError;

    /// Parses the `"YYYY-MM"` form used by dashboard and export filters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_validates_month() {
        assert!(BillingMonth::new(2025, 0).is_none());
        assert!(BillingMonth::new(2025, 13).is_none());
        assert!(BillingMonth::new(99, 1).is_none());
        assert!(BillingMonth::new(2025, 9).is_some());
    }

    #[rstest]
    #[case(2025, 9, 2025, 10)]
    #[case(2025, 12, 2026, 1)]
    #[case(2024, 1, 2024, 2)]
    fn test_next_month(
        #[case] year: i32,
        #[case] month: u32,
        #[case] next_year: i32,
        #[case] next_month: u32,
    ) {
        let next = BillingMonth::new(year, month).unwrap().next();
        assert_eq!(next, BillingMonth::new(next_year, next_month).unwrap());
    }

    #[test]
    fn test_bounds_are_half_open() {
        let month = BillingMonth::new(2025, 9).unwrap();
        let (first, next_first) = month.bounds();
        assert_eq!(first, date(2025, 9, 1));
        assert_eq!(next_first, date(2025, 10, 1));

        assert!(month.contains(date(2025, 9, 1)));
        assert!(month.contains(date(2025, 9, 30)));
        assert!(!month.contains(date(2025, 10, 1)));
        assert!(!month.contains(date(2025, 8, 31)));
    }

    #[test]
    fn test_december_bounds_roll_over() {
        let (first, next_first) = BillingMonth::new(2025, 12).unwrap().bounds();
        assert_eq!(first, date(2025, 12, 1));
        assert_eq!(next_first, date(2026, 1, 1));
    }

    #[test]
    fn test_keys() {
        let month = BillingMonth::new(2025, 9).unwrap();
        assert_eq!(month.key(), "2025-09");
        assert_eq!(month.compact(), "202509");
        assert_eq!(month.to_string(), "2025-09");
    }

    #[test]
    fn test_parse() {
        let month: BillingMonth = "2025-09".parse().unwrap();
        assert_eq!(month, BillingMonth::new(2025, 9).unwrap());

        assert!("2025".parse::<BillingMonth>().is_err());
        assert!("2025-13".parse::<BillingMonth>().is_err());
        assert!("09-2025".parse::<BillingMonth>().is_err());
        assert!("abcd-ef".parse::<BillingMonth>().is_err());
    }

    #[test]
    fn test_ordering_follows_time() {
        let a: BillingMonth = "2024-12".parse().unwrap();
        let b: BillingMonth = "2025-01".parse().unwrap();
        assert!(a < b);
    }
}
